use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Currency, Engine, Money};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "quaderno_admin")]
#[command(about = "Admin utilities for Quaderno (bootstrap users/accounts)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./quaderno.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Account(Account),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    password: String,
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    owner: String,
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "EUR")]
    currency: String,
    /// Opening balance in major units, e.g. "100.00".
    #[arg(long, default_value = "0")]
    opening_balance: String,
}

async fn connect(database_url: &str) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn create_user(
    db: &DatabaseConnection,
    args: UserCreateArgs,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let user = users::ActiveModel {
        username: Set(args.username.clone()),
        password: Set(args.password),
    };
    users::Entity::insert(user).exec(db).await?;
    println!("created user '{}'", args.username);
    Ok(())
}

async fn create_account(
    db: DatabaseConnection,
    args: AccountCreateArgs,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let currency = Currency::try_from(args.currency.as_str())?;
    let opening_balance: Money = args.opening_balance.parse()?;

    let engine = Engine::builder().database(db).build().await?;
    let account = engine
        .new_account(&args.owner, &args.name, currency, opening_balance)
        .await?;
    println!(
        "created account '{}' ({}) with balance {} {}",
        account.name, account.id, account.balance, account.currency
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let db = connect(&cli.database_url).await?;

    match cli.command {
        Command::User(user) => match user.command {
            UserCommand::Create(args) => create_user(&db, args).await?,
        },
        Command::Account(account) => match account.command {
            AccountCommand::Create(args) => create_account(db, args).await?,
        },
    }

    Ok(())
}
