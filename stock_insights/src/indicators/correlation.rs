use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::rolling::sample_std;
use crate::models::PriceBar;

/// Close prices of several tickers on the dates they all traded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedCloses {
    /// Column order.
    pub tickers: Vec<String>,
    /// Date-ascending rows; `closes[k]` belongs to `tickers[k]`.
    pub rows: Vec<AlignedRow>,
}

/// One date of an [`AlignedCloses`] table.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    /// Trading day present in every input series.
    pub date: NaiveDate,
    /// Close per ticker; a stored bar may lack its close.
    pub closes: Vec<Option<f64>>,
}

impl AlignedCloses {
    /// Whether no date is shared by all series.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The column for `ticker`, if present.
    pub fn column(&self, ticker: &str) -> Option<Vec<Option<f64>>> {
        let k = self.tickers.iter().position(|t| t == ticker)?;
        Some(self.rows.iter().map(|r| r.closes[k]).collect())
    }
}

/// Joins the close series of several tickers on trade date.
///
/// Only dates present in every series survive (an inner join); an empty
/// input or any empty series gives no rows.
pub fn align_closes<'a, I, S>(series: I) -> AlignedCloses
where
    I: IntoIterator<Item = (S, &'a [PriceBar])>,
    S: Into<String>,
{
    let mut tickers = Vec::new();
    let mut by_date: Vec<BTreeMap<NaiveDate, Option<f64>>> = Vec::new();
    for (ticker, bars) in series {
        tickers.push(ticker.into());
        by_date.push(bars.iter().map(|b| (b.trade_date, b.close)).collect());
    }

    let Some((first, rest)) = by_date.split_first() else {
        return AlignedCloses::default();
    };

    let rows = first
        .keys()
        .filter(|d| rest.iter().all(|m| m.contains_key(*d)))
        .map(|d| AlignedRow {
            date: *d,
            closes: by_date.iter().map(|m| m.get(d).copied().flatten()).collect(),
        })
        .collect();

    AlignedCloses { tickers, rows }
}

/// Symmetric Pearson correlation matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationMatrix {
    /// Row and column order.
    pub tickers: Vec<String>,
    /// `values[i][j]` correlates `tickers[i]` with `tickers[j]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlation between two tickers by name.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.tickers.iter().position(|t| t == a)?;
        let j = self.tickers.iter().position(|t| t == b)?;
        self.values[i][j]
    }

    /// Whether the matrix has no tickers.
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

/// Pearson correlation of paired samples. `None` with fewer than two pairs
/// or when either side is constant.
fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return None;
    }
    let (sx, sy) = (sample_std(xs)?, sample_std(ys)?);
    if sx == 0.0 || sy == 0.0 {
        return None;
    }
    let mx = xs.iter().sum::<f64>() / n as f64;
    let my = ys.iter().sum::<f64>() / n as f64;
    let cov = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mx) * (y - my))
        .sum::<f64>()
        / (n - 1) as f64;
    Some((cov / (sx * sy)).clamp(-1.0, 1.0))
}

/// Pairwise Pearson correlation of the aligned close columns.
///
/// Each pair uses the rows where both closes are present. The diagonal is
/// exactly 1 for any column with at least two distinct values; a pair without
/// enough variation or overlap is `None`.
pub fn correlation_matrix(aligned: &AlignedCloses) -> CorrelationMatrix {
    let k = aligned.tickers.len();
    let mut values = vec![vec![None; k]; k];

    for i in 0..k {
        for j in i..k {
            let (xs, ys): (Vec<f64>, Vec<f64>) = aligned
                .rows
                .iter()
                .filter_map(|r| Some((r.closes[i]?, r.closes[j]?)))
                .unzip();
            let r = pearson(&xs, &ys).map(|r| if i == j { 1.0 } else { r });
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        tickers: aligned.tickers.clone(),
        values,
    }
}
