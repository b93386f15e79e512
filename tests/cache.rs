use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use gss_explorer::{DataSource, Result, SurveyCache, SurveyError};

const PAYLOAD: &str = "id,wtss,sex,educ,region,age,coninc,prestg10,mapres10,papres10,sei10,satjob,fechld,fefam,fepol,fepresch,meovrwrk\n\
1,1.0,male,12,pacific,40,30000,45,40,42,50.1,very satisfied,agree,disagree,disagree,agree,agree\n\
2,1.0,female,16,mountain,35,52000,60,38,51,71.3,mod. satisfied,agree,disagree,disagree,disagree,disagree\n";

/// Serves a fixed payload slowly, counting fetches; fails the first
/// `failures` of them.
struct CountingSource {
    fetches: AtomicUsize,
    failures: usize,
}

impl CountingSource {
    fn new(failures: usize) -> Self {
        Self {
            fetches: AtomicUsize::new(0),
            failures,
        }
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl DataSource for CountingSource {
    fn name(&self) -> String {
        "counting".into()
    }

    fn fetch(&self) -> Result<Vec<u8>> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        if n < self.failures {
            return Err(SurveyError::UnreachableSource {
                source_name: self.name(),
                reason: "connection reset".into(),
            });
        }
        Ok(PAYLOAD.as_bytes().to_vec())
    }
}

#[test]
fn concurrent_first_access_fetches_once() {
    let cache = SurveyCache::new(CountingSource::new(0));

    let surveys: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| cache.get())).collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect()
    });

    assert_eq!(cache.source().fetches(), 1);
    assert_eq!(surveys[0].len(), 2);
    for survey in &surveys[1..] {
        assert!(Arc::ptr_eq(&surveys[0], survey));
    }
}

#[test]
fn later_calls_reuse_the_prepared_survey() {
    let cache = SurveyCache::new(CountingSource::new(0));
    assert!(!cache.is_loaded());

    let first = cache.get().unwrap();
    let second = cache.get().unwrap();
    assert!(cache.is_loaded());
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.source().fetches(), 1);
}

#[test]
fn failed_load_is_retried() {
    let cache = SurveyCache::new(CountingSource::new(1));

    let err = cache.get().unwrap_err();
    assert!(err.is_load_failure());
    assert!(!cache.is_loaded());

    let survey = cache.get().unwrap();
    assert_eq!(survey.len(), 2);
    assert_eq!(cache.source().fetches(), 2);
}
