use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use std::net::SocketAddr;

/// Bucket bounds for one histogram, keyed by its full metric name.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBuckets {
    pub metric: String,
    pub bounds: Vec<f64>,
}

impl HistogramBuckets {
    pub fn new(metric: impl Into<String>, bounds: &[f64]) -> Self {
        Self {
            metric: metric.into(),
            bounds: bounds.to_vec(),
        }
    }
}

/// Process-wide metrics sink. Built once and passed to whoever records;
/// never installed as the global `metrics` recorder.
pub struct MetricsSink {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

impl MetricsSink {
    /// Sink without an HTTP listener; the text exposition is available
    /// through `render`.
    pub fn detached(histograms: &[HistogramBuckets]) -> Result<Self, String> {
        let recorder = configure(PrometheusBuilder::new(), histograms)?.build_recorder();
        let handle = recorder.handle();
        Ok(Self { recorder, handle })
    }

    /// Sink whose exposition is served over HTTP on `listen_addr`. The
    /// listener runs as a task on `runtime`, concurrently with whatever
    /// thread records into the sink.
    pub fn serve(
        listen_addr: SocketAddr,
        histograms: &[HistogramBuckets],
        runtime: &tokio::runtime::Handle,
    ) -> Result<Self, String> {
        let builder = configure(
            PrometheusBuilder::new().with_http_listener(listen_addr),
            histograms,
        )?;
        let (recorder, exporter) = {
            let _guard = runtime.enter();
            builder
                .build()
                .map_err(|err| format!("failed to build prometheus exporter: {err}"))?
        };
        runtime.spawn(async move {
            if let Err(err) = exporter.await {
                tracing::error!(error = ?err, "prometheus exporter stopped");
            }
        });
        tracing::info!(metrics_addr = %listen_addr, "prometheus metrics exporter enabled");

        let handle = recorder.handle();
        Ok(Self { recorder, handle })
    }

    pub fn recorder(&self) -> &PrometheusRecorder {
        &self.recorder
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }
}

fn configure(
    mut builder: PrometheusBuilder,
    histograms: &[HistogramBuckets],
) -> Result<PrometheusBuilder, String> {
    for histogram in histograms {
        builder = builder
            .set_buckets_for_metric(Matcher::Full(histogram.metric.clone()), &histogram.bounds)
            .map_err(|err| {
                format!(
                    "invalid histogram buckets for {}: {err}",
                    histogram.metric
                )
            })?;
    }
    Ok(builder)
}
