//! Author name heuristics, each exercised on its own and through the resolver.

use parley_engine::dom::MemoryPage;
use parley_engine::resolution::{AuthorHeuristic, AuthorResolver};

const URL: &str = "https://www.facebook.com/posts/1/?comment_id=100";

fn container_page(inner: &str) -> MemoryPage {
    MemoryPage::new(
        URL,
        &format!(r#"<html><body><div role="article">{}</div></body></html>"#, inner),
    )
}

#[tokio::test]
async fn test_first_link_skips_timestamps_and_action_labels() {
    let page = container_page(
        r#"
        <a href="https://www.facebook.com/jane.doe/posts/9">3h</a>
        <a href="https://www.facebook.com/posts/1/">2 ngày</a>
        <a href="https://www.facebook.com/posts/1/">Phản hồi</a>
        <a href="https://www.facebook.com/posts/1/">Reply</a>
        <a href="https://www.facebook.com/jane.doe">Jane Doe</a>
        "#,
    );
    let article = page.find(r#"[role="article"]"#).unwrap().unwrap();

    let author = AuthorResolver::resolve(&page, article).await.unwrap().unwrap();
    assert_eq!(author.name, "Jane Doe");
    assert_eq!(author.heuristic, AuthorHeuristic::NameLikeLink);
    assert_eq!(author.mention(), "@Jane Doe ");
}

#[tokio::test]
async fn test_first_link_skips_comment_and_media_links() {
    let page = container_page(
        r#"
        <a href="https://www.facebook.com/posts/1/?comment_id=100">Nguyễn Văn An</a>
        <a href="https://www.facebook.com/photo.php?fbid=1">Summer album</a>
        <a href="https://www.facebook.com/nguyen.van.an">Nguyễn Văn An</a>
        "#,
    );
    let article = page.find(r#"[role="article"]"#).unwrap().unwrap();

    let name = AuthorResolver::run(AuthorHeuristic::NameLikeLink, &page, article)
        .await
        .unwrap();
    assert_eq!(name.as_deref(), Some("Nguyễn Văn An"));
}

#[tokio::test]
async fn test_author_markup_next_to_link() {
    let page = container_page(
        r#"
        <span>Top fan</span>
        <a href="https://www.facebook.com/people/x/123"><span dir="auto">Trần Thị B</span></a>
        "#,
    );
    let article = page.find(r#"[role="article"]"#).unwrap().unwrap();

    let name = AuthorResolver::run(AuthorHeuristic::AuthorMarkup, &page, article)
        .await
        .unwrap();
    assert_eq!(name.as_deref(), Some("Trần Thị B"));
}

#[tokio::test]
async fn test_author_markup_requires_adjacent_link() {
    let page = container_page(r#"<strong>Jane Doe</strong><p>Nice photo!</p>"#);
    let article = page.find(r#"[role="article"]"#).unwrap().unwrap();

    let name = AuthorResolver::run(AuthorHeuristic::AuthorMarkup, &page, article)
        .await
        .unwrap();
    assert!(name.is_none());
}

#[tokio::test]
async fn test_no_author_is_not_an_error() {
    let page = container_page(
        r#"
        <a href="https://www.facebook.com/posts/1/?comment_id=100">1 giờ</a>
        <span>Like</span>
        "#,
    );
    let article = page.find(r#"[role="article"]"#).unwrap().unwrap();

    assert!(AuthorResolver::resolve(&page, article).await.unwrap().is_none());
}

#[tokio::test]
async fn test_profile_url_skips_comment_and_media_links() {
    let page = container_page(
        r#"
        <a href="https://www.facebook.com/posts/1/?comment_id=100">1h</a>
        <a href="https://www.facebook.com/photo.php?fbid=1">Album</a>
        <a href="https://www.facebook.com/profile.php?id=1000123">Lê Minh</a>
        "#,
    );
    let article = page.find(r#"[role="article"]"#).unwrap().unwrap();

    let name = AuthorResolver::run(AuthorHeuristic::ProfileUrl, &page, article)
        .await
        .unwrap();
    assert_eq!(name.as_deref(), Some("Lê Minh"));
}

#[tokio::test]
async fn test_profile_url_is_the_last_resort() {
    // A one-letter display name fails the name checks of the first two
    // heuristics.
    let page = container_page(
        r#"
        <a href="https://www.facebook.com/posts/1/?comment_id=100">3h</a>
        <a href="https://www.facebook.com/y.nguyen">Ý</a>
        "#,
    );
    let article = page.find(r#"[role="article"]"#).unwrap().unwrap();

    for heuristic in [AuthorHeuristic::NameLikeLink, AuthorHeuristic::AuthorMarkup] {
        let name = AuthorResolver::run(heuristic, &page, article).await.unwrap();
        assert!(name.is_none(), "{heuristic}");
    }

    let author = AuthorResolver::resolve(&page, article).await.unwrap().unwrap();
    assert_eq!(author.name, "Ý");
    assert_eq!(author.heuristic, AuthorHeuristic::ProfileUrl);
    assert_eq!(author.mention(), "@Ý ");
}
