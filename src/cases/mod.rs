//! Catalog of end-to-end test cases
//!
//! Each case is a named record of up to four phase functions. Cases never
//! talk to the network directly; everything goes through
//! [`ResourceActions`].

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::client::ResourceActions;
use crate::error::Result;
use crate::validator::ValidationContext;

mod common;
pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

/// Boxed future returned by a phase function
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Checks the resource declares what the case needs. No network calls.
pub type PreconditionFn = fn(&ValidationContext) -> Result<()>;

/// A setup, run or teardown phase
pub type PhaseFn = for<'a> fn(
    &'a dyn ResourceActions,
    &'a mut ValidationContext,
) -> BoxFuture<'a, Result<()>>;

/// A named end-to-end test case. Missing phases are skipped.
pub struct TestCase {
    pub name: &'static str,
    pub description: &'static str,
    pub precondition: Option<PreconditionFn>,
    pub setup: Option<PhaseFn>,
    pub run: Option<PhaseFn>,
    pub teardown: Option<PhaseFn>,
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase").field("name", &self.name).finish()
    }
}

static CATALOG: [TestCase; 8] = [
    list::LIST_LIMIT_1,
    list::LIST_PAGE_TOKEN,
    create::CREATE,
    create::DUPLICATE_CREATION_CHECK,
    get::GET_RESOURCE,
    update::UPDATE_RESOURCE,
    delete::DELETE_RESOURCE,
    delete::DELETE_NONEXISTENT,
];

/// Every test case, in the order they run.
pub fn catalog() -> &'static [TestCase] {
    &CATALOG
}

pub fn find(name: &str) -> Option<&'static TestCase> {
    CATALOG.iter().find(|case| case.name == name)
}
