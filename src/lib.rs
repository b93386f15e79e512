//! Data preparation and view derivation for a GSS 2018 exploration dashboard.
//!
//! The survey is fetched once, narrowed to a fixed column set, recoded into
//! typed [`Respondent`](data::model::Respondent)s and shared read-only. Each
//! dashboard [`Page`](page::Page) turns it into a [`View`](page::View): plain
//! tables plus the category orders, colours and prompt text a chart renderer
//! needs.

pub mod color;
pub mod data;
pub mod error;
pub mod page;
pub mod state;
pub mod stats;
pub mod view;

pub use data::loader::{gss_2018, DataSource, FileSource, HttpSource, SurveyCache};
pub use data::model::Survey;
pub use error::{Result, SurveyError};
pub use page::{Page, View};
pub use state::DashboardState;
pub use view::{Feature, Group, ViewSpec};
