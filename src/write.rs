use crate::data::{Account, StoreError};

/// Basic CSV exporter for `Account`s, without header. Fields are only quoted
/// when they contain a separator, a quote or a line break.
pub(crate) fn write_accounts<'a, W, I>(writer: W, accounts: I) -> Result<(), StoreError>
where
    W: std::io::Write,
    I: IntoIterator<Item = &'a Account>,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for account in accounts {
        wtr.serialize(account)?;
    }
    wtr.flush()?;
    Ok(())
}
