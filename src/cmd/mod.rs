/// Cine slice summary command.
pub mod cine;
/// File-level information command.
pub mod info;
/// Stderr logger behind `-v`.
pub mod logging;
/// Distilled value printer.
pub mod print;
/// Flat record listing command.
pub mod records;
/// Distilled value display command.
pub mod show;
/// Shared CLI helpers.
pub mod util;

#[cfg(test)]
pub(crate) mod test_support;
