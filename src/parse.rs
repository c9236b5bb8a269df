use encoding_rs::WINDOWS_1251;
use scraper::{Html, Selector};

use crate::error::{Error, Result};
use crate::table::ResultTable;

/// Element whose text carries the result count on the search page.
const TOTAL_SELECTOR: &str = "div.search-results__total";

/// The one byte windows-1251 leaves unassigned.
const CP1251_HOLE: u8 = 0x98;

/// Pulls the result count out of a search results page.
///
/// The widget renders the number with thousands separators and surrounding
/// words, so everything but ASCII digits is thrown away before parsing.
pub fn result_count(html: &str) -> Result<u64> {
    let doc = Html::parse_document(html);
    let total_selector = create_selector(TOTAL_SELECTOR)?;

    let total = doc
        .select(&total_selector)
        .next()
        .ok_or(Error::ParseMissingSelector(TOTAL_SELECTOR))?;
    let text: String = total.text().collect();
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();

    digits
        .parse()
        .map_err(|_| Error::ParseCount(format!("no digits in {:?}", text.trim())))
}

/// Decodes one export payload: windows-1251 bytes, semicolon-separated,
/// decimal commas left alone. Ragged rows are tolerated and every cell
/// stays text.
///
/// The decode is strict: a payload containing the unassigned byte is
/// rejected whole rather than passed through with a stand-in character.
pub fn result_table(raw: &[u8]) -> Result<ResultTable> {
    // encoding_rs carries the WHATWG table, which maps all 256 bytes, so
    // the unassigned byte needs an explicit check.
    if raw.contains(&CP1251_HOLE) {
        return Err(Error::ParseEncoding);
    }
    let (text, _, _) = WINDOWS_1251.decode(raw);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(ResultTable { headers, rows })
}

#[inline]
fn create_selector(sel_str: &'static str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str))
}
