use anyhow::{Context, Result};
use clap::Parser;
use tabled::Table;
use tracing_subscriber::EnvFilter;

use api_client::{model as domain, ApiClient, ClientView};

pub mod model;

#[derive(Parser)]
#[command(name = "booksorter")]
#[command(about = "Keep track of the books you mean to read")]
struct CliArgs {
    #[arg(
        long,
        env = "BOOKSORTER_URL",
        default_value = "http://localhost:3001",
        help = "Base URL of the booksorter API"
    )]
    base_url: String,

    #[command(subcommand)]
    command: model::Command,
}

struct BookSorter(ClientView<ApiClient>);

impl BookSorter {
    fn new(client: ApiClient) -> Self {
        Self(ClientView::new(client))
    }

    async fn dispatch(&mut self, command: model::Command) -> Result<()> {
        let Self(view) = self;
        view.refresh().await.context("unable to load the book list")?;

        match command {
            model::Command::List { sort } => {
                print_books(view.sort_by(sort));
                Ok(())
            }
            model::Command::Add(model::NewBook { title, author }) => {
                if let Some(book) = view.add(&title, &author).await? {
                    println!("Added [{}] {} by {}", book.id, book.title, book.author);
                } else {
                    println!("Nothing added, a book needs both a title and an author");
                }
                Ok(())
            }
            model::Command::Status { id, status } => {
                let book = view
                    .set_status(id, status)
                    .await
                    .with_context(|| format!("unable to update book {id}"))?;
                println!("[{}] {} is now {}", book.id, book.title, book.status);
                Ok(())
            }
            model::Command::Remove { id } => {
                view.remove(id)
                    .await
                    .with_context(|| format!("unable to remove book {id}"))?;
                println!("Removed book {id}");
                Ok(())
            }
            model::Command::Pick => {
                let (shuffled, picked) = view.shuffle_and_pick(&mut rand::thread_rng());
                print_books(shuffled);
                match picked {
                    Some(domain::Book { title, author, .. }) => {
                        println!();
                        println!("Random book: {title} by {author}");
                    }
                    None => println!("The list is empty, nothing to pick"),
                }
                Ok(())
            }
        }
    }
}

fn print_books(books: Vec<domain::Book>) {
    let rows: Vec<model::BookRow> = books.into_iter().map(model::BookRow::from).collect();
    println!("{}", Table::new(rows));
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let mut sorter = BookSorter::new(ApiClient::new(&args.base_url));
    sorter.dispatch(args.command).await
}
