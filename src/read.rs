use crate::data::{normalize, Account};

/// Simple CSV importer for `Account`s, one record per line and no header.
///
/// A line that doesn't parse ends the import: it is logged, and whatever was
/// read before it is returned. Lines after it are not looked at.
pub(crate) fn read_accounts<R: std::io::Read>(reader: R) -> Vec<Account> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(reader);
    let mut accounts = Vec::new();
    for result in rdr.deserialize::<Account>() {
        match result {
            Ok(mut account) => {
                account.balance = normalize(account.balance);
                accounts.push(account);
            }
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                log::error!("Failed to parse account on line {line}: {e}");
                break;
            }
        }
    }
    accounts
}
