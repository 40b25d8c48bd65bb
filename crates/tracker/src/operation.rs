use std::future::Future;
use std::pin::Pin;

use crate::error::BoxError;

/// A pinned, boxed future that is required to be Send.
pub type BoxFutureSend<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An opaque host operation whose edits surface only as change events.
pub type Operation<'a> = BoxFutureSend<'a, Result<(), BoxError>>;

/// Boxes `operation`, erasing its error type.
pub fn boxed<'a, F, E>(operation: F) -> Operation<'a>
where
	F: Future<Output = Result<(), E>> + Send + 'a,
	E: Into<BoxError>,
{
	Box::pin(async move { operation.await.map_err(Into::into) })
}
