//! Locator extraction and container resolution against static thread markup.

use parley_engine::dom::MemoryPage;
use parley_engine::locator::TargetLocator;
use parley_engine::page::Page;
use parley_engine::protocol::ElementHandle;
use parley_engine::resolution::{CandidateFinder, CandidateStrategy, resolve_container};

/// Outer comment at depth 2 with a nested reply article at depth 4.
const THREAD: &str = r#"
<html><body>
  <div role="article" id="comment">
    <a href="https://www.facebook.com/jane.doe">Jane Doe</a>
    <a href="https://www.facebook.com/posts/1/?comment_id=100">3h</a>
    <div class="replies">
      <div role="article" id="reply">
        <a href="https://www.facebook.com/john.roe">John Roe</a>
        <a href="https://www.facebook.com/posts/1/?comment_id=100&reply_comment_id=200">1h</a>
      </div>
    </div>
  </div>
</body></html>
"#;

const POST_URL: &str = "https://www.facebook.com/posts/1/";

async fn element_id(page: &MemoryPage, handle: ElementHandle) -> String {
    page.describe(handle)
        .await
        .unwrap()
        .attr("id")
        .unwrap_or_default()
        .to_string()
}

#[test]
fn test_locator_modes() {
    let top = TargetLocator::from_url("https://www.facebook.com/posts/1/?comment_id=100");
    assert!(!top.is_nested_target);
    assert_eq!(top.resolved_id.as_deref(), Some("100"));

    let nested = TargetLocator::from_url(
        "https://www.facebook.com/posts/1/?comment_id=100&reply_comment_id=200",
    );
    assert!(nested.is_nested_target);
    assert_eq!(nested.resolved_id.as_deref(), Some("200"));

    let reply_only = TargetLocator::from_url("https://www.facebook.com/posts/1/?reply_comment_id=200");
    assert!(reply_only.is_nested_target);
    assert_eq!(reply_only.resolved_id.as_deref(), Some("200"));

    let bare = TargetLocator::from_url("https://www.facebook.com/posts/1/");
    assert!(bare.is_empty());
    assert!(!bare.is_nested_target);
}

#[tokio::test]
async fn test_top_level_resolution_picks_shallow_container() {
    let page = MemoryPage::new(format!("{}?comment_id=100", POST_URL), THREAD);
    let locator = TargetLocator::from_url(&page.current_url().await.unwrap());

    let resolution = resolve_container(&page, &locator).await.unwrap();
    let selected = resolution.selected.expect("container");

    assert_eq!(resolution.strategy, Some(CandidateStrategy::AnchorHref));
    assert_eq!(selected.nesting_depth, 2);
    assert!(selected.is_exact_match);
    assert_eq!(element_id(&page, selected.container).await, "comment");
}

#[tokio::test]
async fn test_nested_resolution_picks_deep_container() {
    let page = MemoryPage::new(
        format!("{}?comment_id=100&reply_comment_id=200", POST_URL),
        THREAD,
    );
    let locator = TargetLocator::from_url(&page.current_url().await.unwrap());

    let resolution = resolve_container(&page, &locator).await.unwrap();
    let selected = resolution.selected.expect("container");

    assert_eq!(selected.nesting_depth, 4);
    assert!(selected.is_exact_match);
    assert_eq!(element_id(&page, selected.container).await, "reply");
}

#[tokio::test]
async fn test_reply_link_is_not_exact_for_parent_comment() {
    let page = MemoryPage::new(POST_URL, THREAD);
    let set = CandidateFinder::find(&page, "100", false).await.unwrap();

    assert_eq!(set.candidates.len(), 2);
    let reply = page.find("#reply").unwrap().unwrap();
    let reply_candidate = set
        .candidates
        .iter()
        .find(|c| c.container == reply)
        .unwrap();
    assert!(!reply_candidate.is_exact_match);
}

#[tokio::test]
async fn test_data_attribute_fallback() {
    let html = r#"
    <html><body>
      <div role="article" id="a1"><span data-commentid="555">Great post</span></div>
      <div role="article" id="a2"><span data-commentid="556">Thanks</span></div>
    </body></html>
    "#;
    let page = MemoryPage::new(format!("{}?comment_id=556", POST_URL), html);
    let locator = TargetLocator::from_url(&page.current_url().await.unwrap());

    let resolution = resolve_container(&page, &locator).await.unwrap();
    assert_eq!(resolution.strategy, Some(CandidateStrategy::DataAttribute));
    let selected = resolution.selected.unwrap();
    assert_eq!(element_id(&page, selected.container).await, "a2");
}

#[tokio::test]
async fn test_no_candidates_resolves_to_nothing() {
    let page = MemoryPage::new(format!("{}?comment_id=999", POST_URL), THREAD);
    let locator = TargetLocator::from_url(&page.current_url().await.unwrap());

    let resolution = resolve_container(&page, &locator).await.unwrap();
    assert!(resolution.selected.is_none());
    assert_eq!(resolution.candidate_count, 0);
    assert!(resolution.strategy.is_none());
}

#[tokio::test]
async fn test_empty_locator_skips_search() {
    let page = MemoryPage::new(POST_URL, THREAD);
    let resolution = resolve_container(&page, &TargetLocator::default())
        .await
        .unwrap();
    assert!(resolution.selected.is_none());
}

#[tokio::test]
async fn test_article_scan_reads_encoded_links() {
    let html = r#"
    <html><body>
      <div role="article" id="a1"><a href="/posts/1/?comment%5Fid=99">5h</a></div>
      <div role="article" id="a2"><a href="/posts/1/?comment%5Fid=100">2h</a></div>
    </body></html>
    "#;
    let page = MemoryPage::new(format!("{}?comment_id=100", POST_URL), html);
    let locator = TargetLocator::from_url(&page.current_url().await.unwrap());

    let resolution = resolve_container(&page, &locator).await.unwrap();
    assert_eq!(resolution.strategy, Some(CandidateStrategy::ArticleScan));
    assert_eq!(resolution.candidate_count, 1);
    let selected = resolution.selected.unwrap();
    assert!(selected.is_exact_match);
    assert_eq!(element_id(&page, selected.container).await, "a2");
}

#[tokio::test]
async fn test_article_scan_marks_exactness_per_article() {
    let page = MemoryPage::new(POST_URL, THREAD);
    let candidates = CandidateFinder::run(CandidateStrategy::ArticleScan, &page, "100", false)
        .await
        .unwrap();

    assert_eq!(candidates.len(), 2);
    let comment = page.find("#comment").unwrap().unwrap();
    let reply = page.find("#reply").unwrap().unwrap();
    let exact_of = |handle: ElementHandle| {
        candidates
            .iter()
            .find(|c| c.container == handle)
            .map(|c| c.is_exact_match)
    };
    assert_eq!(exact_of(comment), Some(true));
    assert_eq!(exact_of(reply), Some(false));
}
