use bank::Bank;
use shell::Shell;
use store::Store;

mod args;
mod bank;
mod data;
mod read;
mod shell;
mod store;
mod write;

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = args::parse();
    let store = Store::new(args.file);
    log::debug!("Using accounts file {}", store.path().display());

    let bank = Bank::new(store);
    let stdin = std::io::stdin();
    Shell::new(bank, stdin.lock(), std::io::stdout()).run()?;
    Ok(())
}
