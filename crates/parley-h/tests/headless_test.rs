use parley_engine::config::ParleyConfig;
use parley_engine::page::Page;
use parley_engine::protocol::{ReplyJob, ReplySteps};
use parley_engine::sequencer::{ReplySequencer, SubmitPath};
use parley_h::backend::HeadlessBackend;
use serial_test::serial;

/// Composer that records and clears its content when Enter is pressed, the
/// way the host site does.
const THREAD_HTML: &str = r#"<html><body>
<div role="article" id="comment">
  <span>Great thread</span>
  <div role="button" tabindex="0" id="reply" onclick="document.getElementById('composer').hidden = false">Reply</div>
</div>
<div id="composer" hidden>
  <div contenteditable="true" role="textbox" id="box"></div>
</div>
<script>
  document.getElementById('box').addEventListener('keydown', (e) => {
    if (e.key === 'Enter') {
      window.submitted = e.target.textContent;
      e.target.textContent = '';
    }
  });
</script>
</body></html>"#;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::INFO)
        .try_init()
        .ok();
}

async fn launch() -> Option<HeadlessBackend> {
    let mut backend = HeadlessBackend::new();
    match backend.launch().await {
        Ok(()) => Some(backend),
        Err(e) => {
            eprintln!("Failed to launch browser (is Chromium installed?): {}", e);
            None
        }
    }
}

fn data_url(html: &str) -> String {
    format!("data:text/html,{}", html.replace('\n', "%0A"))
}

#[tokio::test]
#[serial]
async fn test_bridge_queries_and_edits() {
    init_tracing();
    let Some(mut backend) = launch().await else {
        return;
    };

    backend
        .navigate(&data_url(THREAD_HTML))
        .await
        .expect("Navigation failed");
    let mut page = backend.page().unwrap();

    let articles = page.query_all(None, r#"[role="article"]"#).await.unwrap();
    assert_eq!(articles.len(), 1);
    let reply = page.query_all(Some(articles[0]), r#"[role="button"]"#).await.unwrap()[0];
    let info = page.describe(reply).await.unwrap();
    assert_eq!(info.text, "Reply");
    assert!(info.visible);

    let input = page.query_all(None, r#"[contenteditable="true"]"#).await.unwrap()[0];
    assert!(!page.describe(input).await.unwrap().visible);
    assert!(page.query_all(None, "a[").await.unwrap_err().to_string().contains("a["));

    page.focus(input).await.unwrap();
    page.insert_text(input, "hello").await.unwrap();
    assert_eq!(page.describe(input).await.unwrap().text, "hello");

    backend.navigate("about:blank").await.unwrap();
    let page = backend.page().unwrap();
    assert!(page.describe(input).await.unwrap_err().is_stale());

    backend.close().await.expect("Close failed");
}

#[tokio::test]
#[serial]
async fn test_reply_sequence_in_browser() {
    init_tracing();
    let Some(mut backend) = launch().await else {
        return;
    };

    backend
        .navigate(&data_url(THREAD_HTML))
        .await
        .expect("Navigation failed");
    let mut page = backend.page().unwrap();

    let sequencer = ReplySequencer::new(ParleyConfig::immediate());
    let job = ReplyJob::new("hello", ReplySteps::full_reply());
    let (outcome, report) = sequencer.run_detailed(&mut page, &job).await;

    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(report.submit, Some(SubmitPath::EnterKey));

    let client = backend.get_client().unwrap();
    let submitted: String = client
        .page
        .evaluate("window.submitted")
        .await
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(submitted, "hello");

    backend.close().await.expect("Close failed");
}
