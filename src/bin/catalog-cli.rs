use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(about = "Management CLI for the library catalog service", long_about = None)]
struct Cli {
    /// Controller base URL.
    #[arg(short, long, default_value = "http://127.0.0.1:5000/api/library")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every title
    List,
    /// Fetch the title at an index
    Get {
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
    /// Add a title
    Add { name: String },
    /// Replace the first occurrence of a title
    Replace { old: String, new: String },
    /// Delete the first occurrence of a title
    Delete { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::List => client.get(format!("{}/all", base)).send().await?,
        Commands::Get { index } => client.get(format!("{}/get/{}", base, index)).send().await?,
        Commands::Add { name } => {
            client
                .post(format!("{}/bringBook", base))
                .query(&[("bookName", name)])
                .send()
                .await?
        }
        Commands::Replace { old, new } => {
            let mut url = reqwest::Url::parse(base)?;
            url.path_segments_mut()
                .map_err(|_| "URL cannot be a base")?
                .pop_if_empty()
                .extend(["changeBook", old.as_str()]);
            client.put(url).query(&[("newName", new)]).send().await?
        }
        Commands::Delete { name } => {
            let mut url = reqwest::Url::parse(base)?;
            url.path_segments_mut()
                .map_err(|_| "URL cannot be a base")?
                .pop_if_empty()
                .extend(["deleteBook", name.as_str()]);
            client.delete(url).send().await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: catalog returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(json) if json.is_array() => println!("{}", serde_json::to_string_pretty(&json)?),
        _ => println!("{}", text),
    }
    Ok(())
}
