//! Student picker walkthrough against an in-memory list API
//!
//! Run with `RUST_LOG=debug cargo run --example picker_demo --features debug-logging`.

use pagehaus::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const STUDENTS: u32 = 23;
const PAGE_SIZE: u32 = 10;

/// Serves `/users?page=n&role=student` from a fixed roster
struct InMemoryApi {
    latency: Duration,
}

#[async_trait::async_trait]
impl Transport for InMemoryApi {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<String, LoadError> {
        tokio::time::sleep(self.latency).await;

        if path != "/users" {
            return Err(LoadError::transport(format!("404 for {}", path)));
        }
        let page: u32 = params
            .iter()
            .find(|(name, _)| name == "page")
            .and_then(|(_, value)| value.parse().ok())
            .ok_or_else(|| LoadError::transport("400: missing page"))?;

        let first = (page - 1) * PAGE_SIZE + 1;
        let last = (page * PAGE_SIZE).min(STUDENTS);
        let data: Vec<_> = (first..=last)
            .map(|id| {
                json!({
                    "id": id,
                    "full_name": format!("Student {:02}", id),
                    "email": format!("student{:02}@dorm.example", id),
                    "student_code": format!("SV{:04}", 1000 + id),
                })
            })
            .collect();

        Ok(json!({
            "data": data,
            "total": STUDENTS,
            "message": "ok",
            "success": true,
        })
        .to_string())
    }
}

fn print_view(title: &str, view: &ListView<u32>) {
    println!("--- {} ---", title);
    for row in &view.rows {
        let marker = if row.highlighted { ">" } else { " " };
        println!("{} {} ({})", marker, row.label, row.detail.as_deref().unwrap_or("-"));
    }
    if let Some(message) = view.empty_message {
        println!("  {}", message);
    }
    if let Some(sentinel) = view.sentinel {
        println!("  [{:?}]", sentinel);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let pagehaus = PageHaus::new(AppConfig::default())?;
    let _gc = pagehaus.spawn_gc();

    let source: Arc<dyn ListSource<Student>> = Arc::new(JsonListSource::new(
        InMemoryApi {
            latency: Duration::from_millis(50),
        },
        "/users",
    ));
    let field = SelectionState::new();
    let mut picker = pagehaus
        .mount_picker(Student::query_key(), source, field.clone())?
        .with_placeholder("Select a student");

    println!("trigger: {}", picker.selected_label());
    if let Some(initial) = picker.open() {
        initial.settled().await;
    }
    print_view("opened", &picker.render());

    // Scroll until the sentinel stops appearing
    while picker.render().sentinel.is_some() {
        if let TriggerOutcome::Issued(request) = picker.notify_sentinel(true) {
            request.settled().await;
        }
        picker.notify_sentinel(false);
        tokio::time::sleep(pagehaus.config().trigger.throttle_delay()).await;
    }
    print_view("all pages", &picker.render());

    picker.set_search_term("sv102");
    picker.handle_key(PickerKey::Down);
    print_view("search 'sv102'", &picker.render());
    picker.handle_key(PickerKey::Enter);

    println!("selected id: {:?}", field.value());
    println!("trigger: {}", picker.selected_label());
    println!("signals: {:?}", pagehaus.signals().stats());
    Ok(())
}
