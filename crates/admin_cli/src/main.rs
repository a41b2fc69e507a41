use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, FailDraft};
use migration::MigratorTrait;
use sea_orm::Database;

#[derive(Parser, Debug)]
#[command(name = "codefails_admin")]
#[command(about = "Admin utilities for codefails (seed users and posts)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./codefails.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Fail(Fail),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct Fail {
    #[command(subcommand)]
    command: FailCommand,
}

#[derive(Subcommand, Debug)]
enum FailCommand {
    Create(FailCreateArgs),
}

#[derive(Args, Debug)]
struct FailCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: String,
    /// Display author; defaults to "Anonymous" when omitted.
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    created_by: i32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = Database::connect(&cli.database_url).await?;
    migration::Migrator::up(&db, None).await?;
    let engine = Engine::builder().database(db).build();

    match cli.command {
        Command::User(user) => match user.command {
            UserCommand::Create(args) => {
                let user = engine.new_user(&args.name, &args.email).await?;
                println!("created user {} <{}> with id {}", user.name, user.email, user.id);
            }
            UserCommand::List => {
                for user in engine.list_users().await? {
                    println!("{}\t{}\t{}", user.id, user.name, user.email);
                }
            }
        },
        Command::Fail(fail) => match fail.command {
            FailCommand::Create(args) => {
                let fail = engine
                    .new_fail(FailDraft {
                        name: args.name,
                        description: args.description,
                        author: args.author,
                        created_by: args.created_by,
                    })
                    .await?;
                println!("created fail \"{}\" with id {}", fail.name, fail.id);
            }
        },
    }

    Ok(())
}
