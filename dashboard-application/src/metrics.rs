use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    pages_rendered: AtomicU64,
    page_errors: AtomicU64,
    panels_rendered: AtomicU64,
    panels_failed: AtomicU64,
    anomalies: AtomicU64,
}

impl Metrics {
    pub fn record_page(&self, panels: usize, failed: usize) {
        self.pages_rendered.fetch_add(1, Ordering::Relaxed);
        self.panels_rendered.fetch_add(panels as u64, Ordering::Relaxed);
        self.panels_failed.fetch_add(failed as u64, Ordering::Relaxed);
    }

    pub fn record_page_error(&self) {
        self.page_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_anomalies(&self, count: usize) {
        self.anomalies.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn pages_rendered(&self) -> u64 {
        self.pages_rendered.load(Ordering::Relaxed)
    }

    pub fn panels_failed(&self) -> u64 {
        self.panels_failed.load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self) -> String {
        let pages = self.pages_rendered.load(Ordering::Relaxed);
        let page_errors = self.page_errors.load(Ordering::Relaxed);
        let panels = self.panels_rendered.load(Ordering::Relaxed);
        let failed = self.panels_failed.load(Ordering::Relaxed);
        let anomalies = self.anomalies.load(Ordering::Relaxed);

        format!(
            "# TYPE honeydash_pages_rendered_total counter\n\
honeydash_pages_rendered_total {}\n\
# TYPE honeydash_page_errors_total counter\n\
honeydash_page_errors_total {}\n\
# TYPE honeydash_panels_rendered_total counter\n\
honeydash_panels_rendered_total {}\n\
# TYPE honeydash_panels_failed_total counter\n\
honeydash_panels_failed_total {}\n\
# TYPE honeydash_anomalies_flagged_total counter\n\
honeydash_anomalies_flagged_total {}\n",
            pages, page_errors, panels, failed, anomalies
        )
    }
}
