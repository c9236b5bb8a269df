use url::Url;

use crate::search::FetchTask;

/// Results page carrying the count widget, as copied out of a browser. The
/// trailing parameters are the portal's own search defaults; a task only
/// replaces the ones it owns.
const SEARCH_PAGE: &str = "https://zakupki.gov.ru/epz/order/extendedsearch/results.html?\
    searchString=&morphology=on&search-filter=%D0%94%D0%B0%D1%82%D0%B5+\
    %D1%80%D0%B0%D0%B7%D0%BC%D0%B5%D1%89%D0%B5%D0%BD%D0%B8%D1%8F&pageNumber=1&\
    sortDirection=false&recordsPerPage=_10&showLotsInfoHidden=false&sortBy=UPDATE_DATE&\
    fz44=on&fz223=on&af=on&currencyIdGeneral=-1&publishDateFrom=&publishDateTo=";

/// CSV export endpoint matching the search page above.
const EXPORT_PAGE: &str = "https://zakupki.gov.ru/epz/order/orderCsvSettings/extendedSearch/download.html?\
    searchString=&morphology=on&search-filter=%D0%94%D0%B0%D1%82%D0%B5+\
    %D1%80%D0%B0%D0%B7%D0%BC%D0%B5%D1%89%D0%B5%D0%BD%D0%B8%D1%8F&sortDirection=false&\
    showLotsInfoHidden=false&sortBy=UPDATE_DATE&fz44=on&fz223=on&af=on&\
    currencyIdGeneral=-1&publishDateFrom=&publishDateTo=";

/// The two endpoints a search talks to. `Default` points at the live
/// portal; tests and mirrors build their own.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub search: Url,
    pub export: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            search: Url::parse(SEARCH_PAGE).expect("search page template should be a valid url"),
            export: Url::parse(EXPORT_PAGE).expect("export template should be a valid url"),
        }
    }
}

impl Endpoints {
    /// URL of the results page whose body carries `task`'s result count.
    pub fn count_url(&self, task: &FetchTask) -> Url {
        replace_query(&self.search, &task.query_params())
    }

    /// URL of the CSV export for `task`'s window and offset slice.
    pub fn export_url(&self, task: &FetchTask) -> Url {
        replace_query(&self.export, &task.query_params())
    }
}

/// Re-encodes `base` with `params` replacing any same-named parameters.
/// Parameters the task doesn't own survive untouched, repeats included.
fn replace_query(base: &Url, params: &[(&'static str, String)]) -> Url {
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(name, _)| params.iter().all(|(replaced, _)| name.as_ref() != *replaced))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (name, value) in &kept {
            pairs.append_pair(name, value);
        }
        for (name, value) in params {
            pairs.append_pair(name, value);
        }
    }
    url
}
