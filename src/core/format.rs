/*!

Call matrices and call graphs are printed in a few different ways depending on the context: compactly inside log lines,
as tables in test failure messages, and with parameter labels when debugging. This module provides a unified API for
formatting them.

*/

use std::fmt::Display;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum FormatStyle {
  #[default]
  Default, // A table, one row per line
  Simple,  // A single line, rows separated by `;`
  Debug,   // A table with row and column labels
}

pub trait Formattable {
  /// Writes a text representation of `self` according to the given `FormatStyle`.
  fn repr(&self, style: FormatStyle) -> String;
}

impl Display for dyn Formattable {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", Formattable::repr(self, FormatStyle::Default))
  }
}
