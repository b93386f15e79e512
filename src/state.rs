use std::sync::Arc;

use log::debug;

use crate::data::model::Survey;
use crate::page::{Page, View};
use crate::view::{Feature, Group};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Navigation and selection state for one session, independent of rendering.
///
/// Every interaction re-derives the current view from the shared survey.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// Prepared survey shared with every other session.
    survey: Arc<Survey>,

    /// Page picked in the navigation control.
    pub page: Page,

    /// Attitude question for the explore page.
    pub feature: Feature,

    /// Demographic breakdown for the explore page.
    pub group: Group,
}

impl DashboardState {
    pub fn new(survey: Arc<Survey>) -> Self {
        Self {
            survey,
            page: Page::Overview,
            feature: Feature::Satjob,
            group: Group::Sex,
        }
    }

    pub fn survey(&self) -> &Survey {
        &self.survey
    }

    /// Switch page and return its view.
    pub fn navigate(&mut self, page: Page) -> View {
        self.page = page;
        self.current_view()
    }

    /// Change the explore selection and return the explore view.
    pub fn select(&mut self, feature: Feature, group: Group) -> View {
        self.feature = feature;
        self.group = group;
        self.page = Page::Explore;
        self.current_view()
    }

    /// Derive the view for the current page and selection.
    pub fn current_view(&self) -> View {
        debug!(
            "rendering {} (feature={}, group={})",
            self.page, self.feature, self.group
        );
        self.page.render(&self.survey, self.feature, self.group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_overview() {
        let state = DashboardState::new(Arc::new(Survey::default()));
        let view = state.current_view();
        assert_eq!(view.page, Page::Overview);
        assert_eq!(view.title, "Overview");
    }

    #[test]
    fn select_switches_to_explore() {
        let mut state = DashboardState::new(Arc::new(Survey::default()));
        let view = state.select(Feature::MenOverwork, Group::Region);
        assert_eq!(state.page, Page::Explore);
        let spec = view.spec.unwrap();
        assert_eq!(spec.feature, Feature::MenOverwork);
        assert_eq!(spec.color_map.legend_entries().len(), 9);

        let view = state.navigate(Page::Boxplots);
        assert_eq!(view.page, Page::Boxplots);
        // Selection survives navigation.
        assert_eq!(state.feature, Feature::MenOverwork);
    }

    #[test]
    fn sessions_share_one_survey() {
        let survey = Arc::new(Survey::default());
        let a = DashboardState::new(Arc::clone(&survey));
        let b = DashboardState::new(Arc::clone(&survey));
        assert!(std::ptr::eq(a.survey(), b.survey()));
    }
}
