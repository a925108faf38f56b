use dotenvy::dotenv;

use grokipedia::cli::RootCommand;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Handle Ctrl+C gracefully
    let result = tokio::select! {
        result = RootCommand::execute() => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted by user");
            std::process::exit(130);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
