//! CSV parsing for operator-driven imports.
//!
//! The fetch jobs that normally feed the store are external; these parsers
//! let an operator replay their output from disk. Files are plain
//! comma-separated text with a header row; optional columns may be empty.

use chrono::NaiveDate;

use crate::domain::{MacroObservation, MetalId, Ohlc, PriceObservation};
use crate::error::{Error, Result};

/// Column layout resolved from a header row.
struct Header {
    columns: Vec<String>,
}

impl Header {
    fn parse(line: &str, required: &[&str]) -> Result<Self> {
        let columns: Vec<String> = line
            .split(',')
            .map(|c| c.trim().to_ascii_lowercase())
            .collect();
        for name in required {
            if !columns.iter().any(|c| c == name) {
                return Err(Error::Parse(format!("header is missing column '{name}'")));
            }
        }
        Ok(Self { columns })
    }

    fn get<'a>(&self, fields: &'a [&'a str], name: &str) -> Option<&'a str> {
        let index = self.columns.iter().position(|c| c == name)?;
        fields.get(index).map(|f| f.trim()).filter(|f| !f.is_empty())
    }
}

fn parse_date(value: &str, line_no: usize) -> Result<NaiveDate> {
    value
        .parse()
        .map_err(|_| Error::Parse(format!("line {line_no}: invalid date '{value}'")))
}

fn parse_f64(value: &str, name: &str, line_no: usize) -> Result<f64> {
    value
        .parse()
        .map_err(|_| Error::Parse(format!("line {line_no}: invalid {name} '{value}'")))
}

fn parse_i64(value: &str, name: &str, line_no: usize) -> Result<i64> {
    value
        .parse()
        .map_err(|_| Error::Parse(format!("line {line_no}: invalid {name} '{value}'")))
}

fn required<'a>(
    header: &Header,
    fields: &'a [&'a str],
    name: &'static str,
    line_no: usize,
) -> Result<&'a str> {
    header
        .get(fields, name)
        .ok_or_else(|| Error::Parse(format!("line {line_no}: missing {name}")))
}

/// Parse a price CSV (`date,open,high,low,close[,volume][,adjusted_close]`)
/// into observations for one instrument.
///
/// # Errors
/// Returns [`Error::Parse`] naming the offending line, or a domain error
/// if a parsed observation violates an invariant.
pub fn parse_price_csv(
    content: &str,
    metal_id: MetalId,
    source: &str,
) -> Result<Vec<PriceObservation>> {
    let mut lines = numbered_lines(content);
    let (_, header_line) = lines
        .next()
        .ok_or_else(|| Error::Parse("empty file".to_string()))?;
    let header = Header::parse(header_line, &["date", "open", "high", "low", "close"])?;

    let mut observations = Vec::new();
    for (line_no, line) in lines {
        let fields: Vec<&str> = line.split(',').collect();
        let date = parse_date(required(&header, &fields, "date", line_no)?, line_no)?;
        let ohlc = Ohlc::try_new(
            parse_f64(required(&header, &fields, "open", line_no)?, "open", line_no)?,
            parse_f64(required(&header, &fields, "high", line_no)?, "high", line_no)?,
            parse_f64(required(&header, &fields, "low", line_no)?, "low", line_no)?,
            parse_f64(
                required(&header, &fields, "close", line_no)?,
                "close",
                line_no,
            )?,
        )?;
        let volume = header
            .get(&fields, "volume")
            .map(|v| parse_i64(v, "volume", line_no))
            .transpose()?;
        let adjusted_close = header
            .get(&fields, "adjusted_close")
            .map(|v| parse_f64(v, "adjusted_close", line_no))
            .transpose()?;

        observations.push(PriceObservation::try_new(
            metal_id,
            date,
            ohlc,
            volume,
            adjusted_close,
            source,
        )?);
    }
    Ok(observations)
}

/// Parse a macro CSV
/// (`date[,usd_index][,vix][,treasury_yield_10y][,sp500_close][,sp500_return]`).
///
/// # Errors
/// Returns [`Error::Parse`] naming the offending line, or a domain error
/// if a parsed observation violates an invariant.
pub fn parse_macro_csv(content: &str, source: &str) -> Result<Vec<MacroObservation>> {
    let mut lines = numbered_lines(content);
    let (_, header_line) = lines
        .next()
        .ok_or_else(|| Error::Parse("empty file".to_string()))?;
    let header = Header::parse(header_line, &["date"])?;

    let mut observations = Vec::new();
    for (line_no, line) in lines {
        let fields: Vec<&str> = line.split(',').collect();
        let date = parse_date(required(&header, &fields, "date", line_no)?, line_no)?;
        let field = |name: &'static str| -> Result<Option<f64>> {
            header
                .get(&fields, name)
                .map(|v| parse_f64(v, name, line_no))
                .transpose()
        };

        observations.push(MacroObservation::try_new(
            date,
            field("usd_index")?,
            field("vix")?,
            field("treasury_yield_10y")?,
            field("sp500_close")?,
            field("sp500_return")?,
            source,
        )?);
    }
    Ok(observations)
}

/// Non-empty lines paired with their 1-based file line numbers.
fn numbered_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_price_rows() {
        let csv = "date,open,high,low,close,volume,adjusted_close\n\
                   2024-01-02,100.5,110.0,99.0,105.0,12000,104.2\n\
                   2024-01-03,105.0,106.0,101.0,103.0,,\n";
        let observations = parse_price_csv(csv, MetalId::new(1), "yfinance").unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].volume, Some(12_000));
        assert_eq!(observations[1].volume, None);
        assert_eq!(observations[1].adjusted_close, None);
        assert_eq!(observations[0].source, "yfinance");
    }

    #[test]
    fn header_columns_may_be_reordered() {
        let csv = "close,date,low,high,open\n105.0,2024-01-02,99.0,110.0,100.5\n";
        let observations = parse_price_csv(csv, MetalId::new(1), "yfinance").unwrap();
        assert_eq!(observations[0].ohlc.close, 105.0);
        assert_eq!(observations[0].ohlc.open, 100.5);
    }

    #[test]
    fn missing_required_column_is_a_parse_error() {
        let csv = "date,open,high,low\n2024-01-02,100.5,110.0,99.0\n";
        let result = parse_price_csv(csv, MetalId::new(1), "yfinance");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn bad_number_names_the_line() {
        let csv = "date,open,high,low,close\n\
                   2024-01-02,100.5,110.0,99.0,105.0\n\
                   2024-01-03,abc,110.0,99.0,105.0\n";
        let error = parse_price_csv(csv, MetalId::new(1), "yfinance").unwrap_err();
        assert!(error.to_string().contains("line 3"));
    }

    #[test]
    fn non_positive_close_surfaces_the_domain_error() {
        let csv = "date,open,high,low,close\n2024-01-02,100.5,110.0,99.0,0.0\n";
        let result = parse_price_csv(csv, MetalId::new(1), "yfinance");
        assert!(matches!(result, Err(Error::Domain(_))));
    }

    #[test]
    fn macro_rows_tolerate_gaps() {
        let csv = "date,usd_index,vix,treasury_yield_10y,sp500_close,sp500_return\n\
                   2024-01-02,102.3,15.2,4.1,4700.0,0.004\n\
                   2024-01-03,,16.0,,,\n";
        let observations = parse_macro_csv(csv, "yfinance").unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[1].usd_index, None);
        assert_eq!(observations[1].vix, Some(16.0));
    }
}
