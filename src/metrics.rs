use anyhow::{Context as _, Result, anyhow};
use prometheus::core::Collector as _;
#[cfg(target_os = "linux")]
use prometheus::process_collector::ProcessCollector;
use prometheus::{GaugeVec, Opts, Registry, TextEncoder};

use crate::awair::Reading;

const NAMESPACE: &str = "awair";
const SUBSYSTEM: &str = "climate";
const DEVICE_ADDRESS_LABEL: &str = "device_address";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Temperature,
    RelativeHumidity,
    Co2,
    Voc,
    Pm25,
    Score,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Temperature,
        Metric::RelativeHumidity,
        Metric::Co2,
        Metric::Voc,
        Metric::Pm25,
        Metric::Score,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Temperature => "temp_c",
            Metric::RelativeHumidity => "relative_humidity",
            Metric::Co2 => "co2_ppm",
            Metric::Voc => "voc_ppb",
            Metric::Pm25 => "pm25_ug_m3",
            Metric::Score => "score",
        }
    }

    /// Name as it appears in the exposition output, e.g. `awair_climate_temp_c`.
    pub fn full_name(&self) -> String {
        format!("{NAMESPACE}_{SUBSYSTEM}_{}", self.name())
    }

    pub fn help(&self) -> &'static str {
        match self {
            Metric::Temperature => "The current temperature in C",
            Metric::RelativeHumidity => "The current % relative humidity",
            Metric::Co2 => "The current CO2 PPM",
            Metric::Voc => "The current Volatile Organic Compound reading in parts per billion",
            Metric::Pm25 => {
                "The current concentration of 2.5 micron particles in micrograms per meter cubed"
            }
            Metric::Score => "The current Awair Score",
        }
    }
}

/// Latest value per (metric, device address), backed by a registry owned by this instance.
///
/// A series only exists once a value has been set for its address. On Linux the registry also
/// carries the standard `process_*` series for this process.
pub struct AwairMetrics {
    registry: Registry,
    gauges: [GaugeVec; 6],
}

impl AwairMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let mut gauges = Vec::with_capacity(Metric::ALL.len());
        for metric in Metric::ALL {
            let opts = Opts::new(metric.name(), metric.help())
                .namespace(NAMESPACE)
                .subsystem(SUBSYSTEM);
            let gauge = GaugeVec::new(opts, &[DEVICE_ADDRESS_LABEL])
                .with_context(|| format!("failed to create gauge: {}", metric.full_name()))?;
            registry
                .register(Box::new(gauge.clone()))
                .with_context(|| format!("failed to register gauge: {}", metric.full_name()))?;
            gauges.push(gauge);
        }

        #[cfg(target_os = "linux")]
        registry
            .register(Box::new(ProcessCollector::for_self()))
            .context("failed to register process collector")?;

        let gauges = gauges
            .try_into()
            .map_err(|_| anyhow!("unexpected number of gauges"))?;

        Ok(Self { registry, gauges })
    }

    pub fn set(&self, metric: Metric, address: &str, value: f64) {
        self.gauge(metric).with_label_values(&[address]).set(value);
    }

    pub fn record(&self, address: &str, reading: &Reading) {
        for (metric, value) in reading.metric_values() {
            self.set(metric, address, value);
        }
    }

    /// Current value for `address`, or `None` if nothing was ever recorded for it.
    pub fn get(&self, metric: Metric, address: &str) -> Option<f64> {
        self.gauge(metric)
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .find(|m| {
                m.get_label()
                    .iter()
                    .any(|l| l.get_name() == DEVICE_ADDRESS_LABEL && l.get_value() == address)
            })
            .map(|m| m.get_gauge().get_value())
    }

    /// Renders every known series in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String> {
        TextEncoder::new()
            .encode_to_string(&self.registry.gather())
            .context("failed to encode metrics")
    }

    fn gauge(&self, metric: Metric) -> &GaugeVec {
        &self.gauges[metric as usize]
    }
}
