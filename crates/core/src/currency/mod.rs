//! Currency reference data, exchange rates and converter state.

pub mod converter;
pub mod rates;
pub mod table;

pub use converter::{spawn_fetch, CurrencyConverter, FetchTicket};
pub use rates::{OpenErApi, RateProvider, RateTable};
pub use table::{find, search, Currency, CURRENCIES};
