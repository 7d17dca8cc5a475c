//! Lookup of metrics destinations by app monitor name

use std::pin::pin;

use futures::{Stream, TryStreamExt, stream};
use tokio_util::sync::CancellationToken;

use crate::client::{ApiError, DestinationPage, DestinationRecord, RumApi, cancellable};
use crate::error::{RumError, RumResult};

/// Lazily walk every page of `ListRumMetricsDestinations` for `name`
///
/// The stream ends after the page without a continuation token. It is not
/// restartable; call this again to reissue the listing.
pub fn list_destination_pages<'a, C>(
    client: &'a C,
    name: &'a str,
) -> impl Stream<Item = Result<DestinationPage, ApiError>> + Send + 'a
where
    C: RumApi + ?Sized,
{
    // `Some(token)` means another page is due; `None` means the listing is drained.
    stream::try_unfold(Some(None::<String>), move |cursor| async move {
        let Some(token) = cursor else {
            return Ok::<_, ApiError>(None);
        };
        let page = client.list_destinations(name, token.as_deref()).await?;
        let next = page.next_token.clone().map(Some);
        Ok::<_, ApiError>(Some((page, next)))
    })
}

/// Find the single metrics destination attached to `name`
///
/// Every page is drained before deciding. An empty listing and a
/// service-side `ResourceNotFoundException` both yield [`RumError::NotFound`].
pub async fn find_metrics_destination_by_name<C>(
    client: &C,
    name: &str,
    cancel: &CancellationToken,
) -> RumResult<DestinationRecord>
where
    C: RumApi + ?Sized,
{
    let mut pages = pin!(list_destination_pages(client, name));
    let mut found = Vec::new();

    loop {
        match cancellable(cancel, "listing", name, pages.try_next()).await? {
            Ok(Some(page)) => found.extend(page.destinations.into_iter().flatten()),
            Ok(None) => break,
            Err(ApiError::ResourceNotFound(_)) => {
                return Err(RumError::NotFound {
                    name: name.to_string(),
                });
            }
            Err(source) => return Err(RumError::remote("listing", name, source)),
        }
    }

    single_destination(name, found)
}

/// Apply the exactly-one policy to the accumulated destinations
fn single_destination(name: &str, mut found: Vec<DestinationRecord>) -> RumResult<DestinationRecord> {
    match found.len() {
        0 => Err(RumError::NotFound {
            name: name.to_string(),
        }),
        1 => Ok(found.remove(0)),
        count => Err(RumError::Ambiguous {
            name: name.to_string(),
            count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeRumApi, record};

    #[test]
    fn no_destinations_is_not_found() {
        let err = single_destination("app1", Vec::new()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn single_destination_is_returned() {
        let api = FakeRumApi::new().with_pages(
            "app1",
            vec![vec![Some(record("CloudWatch", None, None))]],
        );
        let found = find_metrics_destination_by_name(&api, "app1", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(found, record("CloudWatch", None, None));
    }

    #[tokio::test]
    async fn empty_page_is_not_found() {
        let api = FakeRumApi::new().with_pages("app1", vec![vec![]]);
        let err = find_metrics_destination_by_name(&api, "app1", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn null_only_pages_are_not_found() {
        let api = FakeRumApi::new().with_pages("app1", vec![vec![None, None], vec![None]]);
        let err = find_metrics_destination_by_name(&api, "app1", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(api.list_calls(), 2);
    }

    #[tokio::test]
    async fn service_not_found_matches_empty_listing() {
        let api = FakeRumApi::new();
        api.fail_next_list(ApiError::ResourceNotFound("no app monitor".to_string()));
        let err = find_metrics_destination_by_name(&api, "missing", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(
            matches!(err, RumError::NotFound { ref name } if name == "missing"),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn other_service_errors_are_remote_call_errors() {
        let api = FakeRumApi::new();
        api.fail_next_list(ApiError::Service("ThrottlingException".to_string()));
        let err = find_metrics_destination_by_name(&api, "app1", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RumError::RemoteCall {
                operation: "listing",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn destinations_across_pages_are_ambiguous() {
        let api = FakeRumApi::new().with_pages(
            "app1",
            vec![
                vec![Some(record("CloudWatch", None, None)), None],
                vec![],
                vec![Some(record(
                    "Evidently",
                    Some("arn:aws:evidently:us-east-1:123456789012:project/p"),
                    None,
                ))],
            ],
        );
        let err = find_metrics_destination_by_name(&api, "app1", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RumError::Ambiguous { count: 2, .. }));
        assert_eq!(api.list_calls(), 3);
    }

    #[tokio::test]
    async fn pages_stream_preserves_order() {
        let api = FakeRumApi::new().with_pages(
            "app1",
            vec![
                vec![Some(record("CloudWatch", None, None))],
                vec![Some(record("Evidently", None, None))],
            ],
        );
        let pages: Vec<DestinationPage> = list_destination_pages(&api, "app1")
            .try_collect()
            .await
            .unwrap();
        let kinds: Vec<String> = pages
            .into_iter()
            .flat_map(|p| p.destinations.into_iter().flatten())
            .map(|r| r.destination)
            .collect();
        assert_eq!(kinds, vec!["CloudWatch", "Evidently"]);
    }

    #[tokio::test]
    async fn cancelled_lookup_does_not_list() {
        let api = FakeRumApi::new().with_pages("app1", vec![vec![]]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = find_metrics_destination_by_name(&api, "app1", &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(api.list_calls(), 0);
    }

    #[tokio::test]
    async fn cancelled_between_pages_stops_listing() {
        let cancel = CancellationToken::new();
        let api = FakeRumApi::new()
            .with_pages(
                "app1",
                vec![
                    vec![Some(record("CloudWatch", None, None))],
                    vec![Some(record("Evidently", None, None))],
                ],
            )
            .cancelling_after_first_page(cancel.clone());

        let err = find_metrics_destination_by_name(&api, "app1", &cancel)
            .await
            .unwrap_err();

        assert!(
            matches!(err, RumError::Cancelled { operation: "listing", ref identifier } if identifier == "app1"),
            "got {err:?}"
        );
        assert_eq!(api.list_calls(), 1);
    }
}
