//! Stock list loading.
//!
//! The stock file holds one entry per line, either `SYMBOL` or
//! `SYMBOL,PURCHASE_PRICE`. Blank lines and `#` comments are skipped. A price
//! that does not parse falls back to 0.00, which means "no cost basis". A file
//! without a single usable entry is an error.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::Symbol;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("error reading stock list: {0}")]
    Io(#[from] io::Error),

    #[error("stock list contains no symbols")]
    Empty,
}

/// Ordered symbols with their purchase prices.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    symbols: Vec<Symbol>,
    purchase_prices: HashMap<Symbol, f64>,
}

impl Portfolio {
    /// Load a stock list from disk.
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
            _ => LoadError::Io(e),
        })?;
        Self::parse(BufReader::new(file))
    }

    /// Parse a stock list from any buffered reader.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, LoadError> {
        let mut symbols = Vec::new();
        let mut purchase_prices = HashMap::new();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (symbol, price) = match line.split_once(',') {
                Some((symbol, rest)) => {
                    // Anything after a second comma is ignored.
                    let raw_price = rest.split(',').next().unwrap_or("").trim();
                    (Symbol::new(symbol), raw_price.parse::<f64>().unwrap_or(0.0))
                }
                None => (Symbol::new(line), 0.0),
            };

            if symbol.is_empty() {
                continue;
            }
            // Later duplicates overwrite the price but keep the first position.
            if purchase_prices.insert(symbol.clone(), price).is_none() {
                symbols.push(symbol);
            }
        }

        if symbols.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Self {
            symbols,
            purchase_prices,
        })
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// 0.00 for symbols without a cost basis (or not in the list).
    pub fn purchase_price(&self, symbol: &Symbol) -> f64 {
        self.purchase_prices.get(symbol).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// `(symbol, purchase price)` pairs in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&Symbol, f64)> + '_ {
        self.symbols.iter().map(|s| (s, self.purchase_price(s)))
    }
}
