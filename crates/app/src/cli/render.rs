//! Table output

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

/// Write a rounded table, right-aligning every column from `numeric_from` on.
pub(crate) fn write_table<const N: usize>(
    out: &mut impl io::Write,
    header: [&str; N],
    rows: impl IntoIterator<Item = [String; N]>,
    numeric_from: usize,
) -> io::Result<()> {
    let mut builder = Builder::default();

    builder.push_record(header);

    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(numeric_from..), Alignment::right());

    writeln!(out, "{table}")
}

/// Write `label: value` lines with the values lined up.
pub(crate) fn write_summary(out: &mut impl io::Write, lines: &[(&str, String)]) -> io::Result<()> {
    let width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    for (label, value) in lines {
        writeln!(out, "{label:<width$}  {value}")?;
    }

    Ok(())
}

pub(crate) fn money(amount: &Money<'static, Currency>) -> String {
    amount.to_string()
}

pub(crate) fn io_error(error: io::Error) -> String {
    format!("failed to write output: {error}")
}
