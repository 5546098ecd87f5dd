use anyhow::Result;
use std::time::Duration;
use toastline_core::{
    Category, Priority, QueueConfig, Strategy, ToastConfigPatch, Toaster, ToasterOptions,
};

pub struct DemoOptions {
    pub strategy: Strategy,
    pub max_toasts: usize,
    pub count: usize,
    pub interval_ms: u64,
    pub duration_ms: u64,
}

const SAMPLES: [(&str, Category, Priority); 5] = [
    ("Profile saved", Category::Success, Priority::Normal),
    ("Sync is taking longer than usual", Category::Warning, Priority::High),
    ("New message from Ada", Category::Info, Priority::Low),
    ("Payment failed", Category::Error, Priority::Urgent),
    ("Uploading report.pdf", Category::Loading, Priority::Normal),
];

/// Pushes `count` sample toasts in real time and prints the queue on every change.
pub async fn run(options: DemoOptions) -> Result<()> {
    let toaster = Toaster::new(ToasterOptions {
        queue: QueueConfig {
            max_toasts: options.max_toasts,
            strategy: options.strategy,
            ..Default::default()
        },
        ..Default::default()
    })?;

    toaster.subscribe(|toasts| {
        let line: Vec<String> = toasts
            .iter()
            .map(|t| {
                let text = t.content.as_text().unwrap_or("<custom>");
                let marker = if t.is_exiting { "~" } else { "" };
                format!("{marker}{text} [{}]", t.priority().as_str())
            })
            .collect();
        println!("{}", line.join(" | "));
    });

    let mut ticker = tokio::time::interval(Duration::from_millis(toaster.tick_interval_ms()));
    let mut spawner = tokio::time::interval(Duration::from_millis(options.interval_ms.max(1)));
    let mut added = 0;

    tracing::info!(count = options.count, strategy = ?options.strategy, "demo started");

    loop {
        tokio::select! {
            _ = ticker.tick() => toaster.tick(),
            _ = spawner.tick(), if added < options.count => {
                let (text, category, priority) = SAMPLES[added % SAMPLES.len()];
                // Loading samples would otherwise never leave.
                let patch = ToastConfigPatch::new()
                    .priority(priority)
                    .duration_ms(options.duration_ms);
                toaster.add(text, category, patch);
                added += 1;
            }
        }

        if added == options.count && toaster.is_empty() {
            break;
        }
    }

    tracing::info!("demo finished");
    Ok(())
}
