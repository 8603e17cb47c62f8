use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    CreateTransactionCmd, Currency, Engine, EngineError, Money, Page, SplitDraft, TransactionKind,
    UpdateTransactionCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for username in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![username.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn checking_account(engine: &Engine, user: &str, opening_minor: i64) -> Uuid {
    engine
        .new_account(user, "Checking", Currency::Usd, Money::new(opening_minor))
        .await
        .unwrap()
        .id
}

async fn category(engine: &Engine, user: &str, name: &str) -> Uuid {
    engine.new_category(user, name).await.unwrap().id
}

fn expense(user: &str, account_id: Uuid, amount_minor: i64, split: (Uuid, i64)) -> CreateTransactionCmd {
    CreateTransactionCmd::new(
        user,
        account_id,
        TransactionKind::Expense,
        Money::new(amount_minor),
    )
    .description("Groceries")
    .split(split.0, Money::new(split.1))
}

fn income(user: &str, account_id: Uuid, amount_minor: i64, split: (Uuid, i64)) -> CreateTransactionCmd {
    CreateTransactionCmd::new(
        user,
        account_id,
        TransactionKind::Income,
        Money::new(amount_minor),
    )
    .description("Salary")
    .split(split.0, Money::new(split.1))
}

#[tokio::test]
async fn expense_moves_balance_and_budget_spend() {
    let (engine, _db) = engine_with_db().await;
    let account_id = checking_account(&engine, "alice", 10_000).await;
    let food = category(&engine, "alice", "Food").await;
    engine
        .new_budget("alice", food, Money::new(5_000))
        .await
        .unwrap();

    engine
        .new_transaction(expense("alice", account_id, 3_000, (food, 3_000)))
        .await
        .unwrap();

    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(account.balance, Money::new(7_000));

    let budgets = engine.budgets("alice").await.unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].amount_spent, Money::new(3_000));
    assert_eq!(budgets[0].budget.amount_available, Money::new(5_000));
}

#[tokio::test]
async fn overdraft_expense_fails_without_side_effects() {
    let (engine, _db) = engine_with_db().await;
    let account_id = checking_account(&engine, "alice", 5_000).await;
    let food = category(&engine, "alice", "Food").await;

    let err = engine
        .new_transaction(expense("alice", account_id, 8_000, (food, 8_000)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InsufficientFunds("Checking".to_string()));

    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(account.balance, Money::new(5_000));

    let transactions = engine
        .transactions("alice", Page::default())
        .await
        .unwrap();
    assert!(transactions.is_empty());
}

#[tokio::test]
async fn create_requires_at_least_one_split() {
    let (engine, _db) = engine_with_db().await;
    let account_id = checking_account(&engine, "alice", 5_000).await;

    let cmd = CreateTransactionCmd::new(
        "alice",
        account_id,
        TransactionKind::Expense,
        Money::new(1_000),
    )
    .description("Groceries");
    let err = engine.new_transaction(cmd).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::ConstraintViolation(
            "transaction must have at least one category split".to_string()
        )
    );
}

#[tokio::test]
async fn create_rejects_foreign_split_category() {
    let (engine, _db) = engine_with_db().await;
    let account_id = checking_account(&engine, "alice", 5_000).await;
    let bobs_category = category(&engine, "bob", "Food").await;

    let err = engine
        .new_transaction(expense("alice", account_id, 1_000, (bobs_category, 1_000)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidReference(format!("category {bobs_category} not exists"))
    );

    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(account.balance, Money::new(5_000));
}

#[tokio::test]
async fn balance_tracks_create_update_delete() {
    let (engine, _db) = engine_with_db().await;
    let account_id = checking_account(&engine, "alice", 10_000).await;
    let food = category(&engine, "alice", "Food").await;
    let salary = category(&engine, "alice", "Salary").await;

    let income_tx = engine
        .new_transaction(income("alice", account_id, 2_000, (salary, 2_000)))
        .await
        .unwrap();
    let expense_tx = engine
        .new_transaction(expense("alice", account_id, 500, (food, 500)))
        .await
        .unwrap();

    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(account.balance, Money::new(11_500));

    // Growing the expense applies only the difference.
    engine
        .update_transaction(
            UpdateTransactionCmd::new(
                "alice",
                expense_tx.id,
                account_id,
                TransactionKind::Expense,
                Money::new(1_500),
            )
            .description("Bigger groceries"),
        )
        .await
        .unwrap();
    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(account.balance, Money::new(10_500));

    // Deleting the income reverses it.
    engine
        .delete_transaction(income_tx.id, "alice")
        .await
        .unwrap();
    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(account.balance, Money::new(8_500));

    // balance == opening + signed sum of surviving transactions
    let transactions = engine
        .transactions("alice", Page::default())
        .await
        .unwrap();
    let signed_sum: i64 = transactions
        .iter()
        .map(|tx| tx.signed_amount().minor())
        .sum();
    assert_eq!(account.balance.minor(), 10_000 + signed_sum);
}

#[tokio::test]
async fn update_moves_balance_between_accounts() {
    let (engine, _db) = engine_with_db().await;
    let account_a = checking_account(&engine, "alice", 10_000).await;
    let account_b = engine
        .new_account("alice", "Savings", Currency::Usd, Money::new(5_000))
        .await
        .unwrap()
        .id;
    let food = category(&engine, "alice", "Food").await;

    let tx = engine
        .new_transaction(expense("alice", account_a, 2_000, (food, 2_000)))
        .await
        .unwrap();
    assert_eq!(
        engine.account(account_a, "alice").await.unwrap().balance,
        Money::new(8_000)
    );

    // Re-home onto B as an income: A gets its delta back, B gains the new one.
    engine
        .update_transaction(
            UpdateTransactionCmd::new(
                "alice",
                tx.id,
                account_b,
                TransactionKind::Income,
                Money::new(1_000),
            )
            .description("Refund"),
        )
        .await
        .unwrap();

    assert_eq!(
        engine.account(account_a, "alice").await.unwrap().balance,
        Money::new(10_000)
    );
    assert_eq!(
        engine.account(account_b, "alice").await.unwrap().balance,
        Money::new(6_000)
    );

    let tx = engine.transaction(tx.id, "alice").await.unwrap();
    assert_eq!(tx.account_id, account_b);
    assert_eq!(tx.kind, TransactionKind::Income);
}

#[tokio::test]
async fn delete_transaction_removes_splits() {
    let (engine, _db) = engine_with_db().await;
    let account_id = checking_account(&engine, "alice", 10_000).await;
    let food = category(&engine, "alice", "Food").await;
    engine
        .new_budget("alice", food, Money::new(5_000))
        .await
        .unwrap();

    let tx = engine
        .new_transaction(expense("alice", account_id, 3_000, (food, 3_000)))
        .await
        .unwrap();
    engine.delete_transaction(tx.id, "alice").await.unwrap();

    assert_eq!(
        engine.account(account_id, "alice").await.unwrap().balance,
        Money::new(10_000)
    );
    let budgets = engine.budgets("alice").await.unwrap();
    assert_eq!(budgets[0].amount_spent, Money::ZERO);
    assert_eq!(
        engine.transaction(tx.id, "alice").await.unwrap_err(),
        EngineError::NotFound("transaction not exists".to_string())
    );
}

#[tokio::test]
async fn replacing_splits_leaves_balance_untouched() {
    let (engine, _db) = engine_with_db().await;
    let account_id = checking_account(&engine, "alice", 10_000).await;
    let food = category(&engine, "alice", "Food").await;
    let drinks = category(&engine, "alice", "Drinks").await;

    let tx = engine
        .new_transaction(expense("alice", account_id, 3_000, (food, 3_000)))
        .await
        .unwrap();

    let tx = engine
        .replace_transaction_splits(
            tx.id,
            "alice",
            vec![
                SplitDraft::new(food, Money::new(1_000)),
                SplitDraft::new(drinks, Money::new(2_000)),
            ],
        )
        .await
        .unwrap();
    assert_eq!(tx.splits.len(), 2);

    assert_eq!(
        engine.account(account_id, "alice").await.unwrap().balance,
        Money::new(7_000)
    );

    let food_budget = engine
        .new_budget("alice", food, Money::new(5_000))
        .await
        .unwrap();
    assert_eq!(food_budget.amount_spent, Money::new(1_000));
    let drinks_budget = engine
        .new_budget("alice", drinks, Money::new(5_000))
        .await
        .unwrap();
    assert_eq!(drinks_budget.amount_spent, Money::new(2_000));
}

#[tokio::test]
async fn replacing_splits_with_empty_set_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let account_id = checking_account(&engine, "alice", 10_000).await;
    let food = category(&engine, "alice", "Food").await;

    let tx = engine
        .new_transaction(expense("alice", account_id, 3_000, (food, 3_000)))
        .await
        .unwrap();

    let err = engine
        .replace_transaction_splits(tx.id, "alice", Vec::new())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ConstraintViolation(
            "transaction must have at least one category split".to_string()
        )
    );

    // Old allocation survives.
    let tx = engine.transaction(tx.id, "alice").await.unwrap();
    assert_eq!(tx.splits.len(), 1);
}

#[tokio::test]
async fn delete_category_relocates_splits_and_drops_budgets() {
    let (engine, _db) = engine_with_db().await;
    let account_id = checking_account(&engine, "alice", 10_000).await;
    let food = category(&engine, "alice", "Food").await;
    let groceries = category(&engine, "alice", "Groceries").await;

    engine
        .new_transaction(expense("alice", account_id, 3_000, (food, 3_000)))
        .await
        .unwrap();
    engine
        .new_budget("alice", food, Money::new(5_000))
        .await
        .unwrap();
    let groceries_budget = engine
        .new_budget("alice", groceries, Money::new(4_000))
        .await
        .unwrap();
    assert_eq!(groceries_budget.amount_spent, Money::ZERO);

    engine
        .delete_category(food, groceries, "alice")
        .await
        .unwrap();

    // The category and its budget are gone; the split moved over.
    assert_eq!(
        engine.category(food, "alice").await.unwrap_err(),
        EngineError::NotFound("category not exists".to_string())
    );
    let budgets = engine.budgets("alice").await.unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].budget.category_id, groceries);
    assert_eq!(budgets[0].amount_spent, Money::new(3_000));

    let transactions = engine
        .transactions("alice", Page::default())
        .await
        .unwrap();
    assert_eq!(transactions[0].splits[0].category_id, groceries);
}

#[tokio::test]
async fn delete_account_relocates_transactions_and_balance_delta() {
    let (engine, _db) = engine_with_db().await;
    let account_a = checking_account(&engine, "alice", 10_000).await;
    let account_b = engine
        .new_account("alice", "Savings", Currency::Usd, Money::new(5_000))
        .await
        .unwrap()
        .id;
    let food = category(&engine, "alice", "Food").await;

    let tx = engine
        .new_transaction(expense("alice", account_a, 3_000, (food, 3_000)))
        .await
        .unwrap();

    engine
        .delete_account(account_a, account_b, "alice")
        .await
        .unwrap();

    assert_eq!(
        engine.account(account_a, "alice").await.unwrap_err(),
        EngineError::NotFound("account not exists".to_string())
    );

    // The transaction now lives on the replacement, and the replacement's
    // balance still satisfies opening + signed sum.
    let tx = engine.transaction(tx.id, "alice").await.unwrap();
    assert_eq!(tx.account_id, account_b);
    assert_eq!(
        engine.account(account_b, "alice").await.unwrap().balance,
        Money::new(2_000)
    );
}

#[tokio::test]
async fn delete_account_rolls_back_when_relocation_overdraws() {
    let (engine, _db) = engine_with_db().await;
    let account_a = checking_account(&engine, "alice", 10_000).await;
    let account_b = engine
        .new_account("alice", "Savings", Currency::Usd, Money::new(1_000))
        .await
        .unwrap()
        .id;
    let food = category(&engine, "alice", "Food").await;

    let tx = engine
        .new_transaction(expense("alice", account_a, 3_000, (food, 3_000)))
        .await
        .unwrap();

    let err = engine
        .delete_account(account_a, account_b, "alice")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InsufficientFunds("Savings".to_string()));

    // Nothing was applied: the account survives and the transaction still
    // points at it.
    let account = engine.account(account_a, "alice").await.unwrap();
    assert_eq!(account.balance, Money::new(7_000));
    let tx = engine.transaction(tx.id, "alice").await.unwrap();
    assert_eq!(tx.account_id, account_a);
    assert_eq!(
        engine.account(account_b, "alice").await.unwrap().balance,
        Money::new(1_000)
    );
}

#[tokio::test]
async fn replacement_references_are_validated() {
    let (engine, _db) = engine_with_db().await;
    let account_id = checking_account(&engine, "alice", 10_000).await;
    let bobs_account = checking_account(&engine, "bob", 1_000).await;
    let food = category(&engine, "alice", "Food").await;

    let err = engine
        .delete_account(account_id, account_id, "alice")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidReference(
            "replacement account must differ from the deleted account".to_string()
        )
    );

    let err = engine
        .delete_account(account_id, Uuid::new_v4(), "alice")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidReference("replacement account not exists".to_string())
    );

    // Another user's account is no better than a missing one.
    let err = engine
        .delete_account(account_id, bobs_account, "alice")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidReference("replacement account not exists".to_string())
    );

    let err = engine
        .delete_category(food, Uuid::new_v4(), "alice")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidReference("replacement category not exists".to_string())
    );
}

#[tokio::test]
async fn budget_spend_reads_are_idempotent() {
    let (engine, _db) = engine_with_db().await;
    let account_id = checking_account(&engine, "alice", 10_000).await;
    let food = category(&engine, "alice", "Food").await;
    let status = engine
        .new_budget("alice", food, Money::new(5_000))
        .await
        .unwrap();

    engine
        .new_transaction(expense("alice", account_id, 3_000, (food, 3_000)))
        .await
        .unwrap();

    let first = engine.budget(status.budget.id, "alice").await.unwrap();
    let second = engine.budget(status.budget.id, "alice").await.unwrap();
    assert_eq!(first.amount_spent, second.amount_spent);
    assert_eq!(first.amount_spent, Money::new(3_000));
}

#[tokio::test]
async fn budget_requires_owned_category_and_positive_amount() {
    let (engine, _db) = engine_with_db().await;
    let bobs_category = category(&engine, "bob", "Food").await;

    let err = engine
        .new_budget("alice", bobs_category, Money::new(5_000))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidReference(format!("category {bobs_category} not exists"))
    );

    let food = category(&engine, "alice", "Food").await;
    let err = engine
        .new_budget("alice", food, Money::ZERO)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ConstraintViolation("budget amount must be > 0".to_string())
    );
}

#[tokio::test]
async fn concurrent_expenses_cannot_overdraw() {
    let (engine, _db) = engine_with_db().await;
    let account_id = checking_account(&engine, "alice", 10_000).await;
    let food = category(&engine, "alice", "Food").await;

    let (first, second) = tokio::join!(
        engine.new_transaction(expense("alice", account_id, 6_000, (food, 6_000))),
        engine.new_transaction(expense("alice", account_id, 6_000, (food, 6_000))),
    );

    // Exactly one succeeds; the loser sees the post-write balance.
    assert!(first.is_ok() != second.is_ok());
    let err = first.and(second).unwrap_err();
    assert_eq!(err, EngineError::InsufficientFunds("Checking".to_string()));

    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(account.balance, Money::new(4_000));
}

#[tokio::test]
async fn transaction_list_paginates_one_indexed() {
    let (engine, _db) = engine_with_db().await;
    let account_id = checking_account(&engine, "alice", 100_000).await;
    let food = category(&engine, "alice", "Food").await;

    for _ in 0..12 {
        engine
            .new_transaction(expense("alice", account_id, 1_000, (food, 1_000)))
            .await
            .unwrap();
    }

    let first_page = engine
        .transactions("alice", Page::default())
        .await
        .unwrap();
    assert_eq!(first_page.len(), 10);

    let second_page = engine
        .transactions("alice", Page { page: 2, limit: 10 })
        .await
        .unwrap();
    assert_eq!(second_page.len(), 2);

    let err = engine
        .transactions("alice", Page { page: 0, limit: 10 })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ConstraintViolation("page must be >= 1".to_string())
    );
}

#[tokio::test]
async fn ownership_hides_foreign_records() {
    let (engine, _db) = engine_with_db().await;
    let account_id = checking_account(&engine, "alice", 10_000).await;
    let food = category(&engine, "alice", "Food").await;

    let tx = engine
        .new_transaction(expense("alice", account_id, 1_000, (food, 1_000)))
        .await
        .unwrap();

    assert_eq!(
        engine.transaction(tx.id, "bob").await.unwrap_err(),
        EngineError::NotFound("transaction not exists".to_string())
    );
    assert_eq!(
        engine.account(account_id, "bob").await.unwrap_err(),
        EngineError::NotFound("account not exists".to_string())
    );
    assert!(engine.transactions("bob", Page::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_category_names_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    category(&engine, "alice", "Food").await;

    let err = engine.new_category("alice", "Food").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::ConstraintViolation("category 'Food' already exists".to_string())
    );

    // Same name is fine for another user.
    engine.new_category("bob", "Food").await.unwrap();
}

#[tokio::test]
async fn set_account_balance_rebases_the_running_total() {
    let (engine, _db) = engine_with_db().await;
    let account_id = checking_account(&engine, "alice", 10_000).await;
    let food = category(&engine, "alice", "Food").await;

    let before = engine.account(account_id, "alice").await.unwrap();
    let account = engine
        .set_account_balance(account_id, "alice", Money::new(2_500))
        .await
        .unwrap();
    assert_eq!(account.balance, Money::new(2_500));
    assert!(account.balance_updated_at >= before.balance_updated_at);

    // The invariant continues from the rebased figure.
    engine
        .new_transaction(expense("alice", account_id, 500, (food, 500)))
        .await
        .unwrap();
    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(account.balance, Money::new(2_000));
}
