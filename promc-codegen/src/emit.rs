//! Rendering of a [`MetricSetDocument`] into Rust source for the
//! `prometheus` crate.
//!
//! Every metric becomes a private field on a `Metrics` handle, a constructor
//! expression inside the single `register` function, an optional label
//! struct and one accessor method. The shape of those pieces depends on the
//! metric's [`Shape`], and each shape has its own emission function below.

use std::collections::BTreeSet;

use proc_macro2::{Ident, Literal, Span, TokenStream};
use promc_core::ident::normalize;
use promc_core::{MetricKind, MetricSetDocument, MetricSpec, Shape};
use quote::{format_ident, quote};
use tracing::debug;

use crate::BANNER;
use crate::canonical::{MalformedSource, canonicalize};

/// Runtime items the generated module imports. Declared in name order so the
/// import list sorts the same way every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Runtime {
    Gauge,
    GaugeVec,
    Histogram,
    HistogramOpts,
    HistogramVec,
    IntCounter,
    IntCounterVec,
    Opts,
    Registry,
    Result,
}

impl Runtime {
    fn ident(self) -> Ident {
        let name = match self {
            Runtime::Gauge => "Gauge",
            Runtime::GaugeVec => "GaugeVec",
            Runtime::Histogram => "Histogram",
            Runtime::HistogramOpts => "HistogramOpts",
            Runtime::HistogramVec => "HistogramVec",
            Runtime::IntCounter => "IntCounter",
            Runtime::IntCounterVec => "IntCounterVec",
            Runtime::Opts => "Opts",
            Runtime::Registry => "Registry",
            Runtime::Result => "Result",
        };
        Ident::new(name, Span::call_site())
    }
}

/// Identifiers derived for one metric.
struct Names {
    field: Ident,
    labels: Ident,
    accessor: Ident,
    label_fields: Vec<Ident>,
}

impl Names {
    fn new(spec: &MetricSpec) -> Self {
        let ident = normalize(&spec.name);
        Self {
            field: format_ident!("{}", ident),
            labels: format_ident!("{}Labels", ident),
            accessor: format_ident!("{}{}", spec.shape().verb(), ident),
            label_fields: spec
                .labels
                .iter()
                .map(|label| format_ident!("{}", normalize(label)))
                .collect(),
        }
    }
}

/// The pieces one metric contributes to the generated module.
struct Rendered {
    field: Ident,
    /// `Field: Type` inside the `Metrics` struct.
    declaration: TokenStream,
    /// `Field: constructor?` inside `register`.
    init: TokenStream,
    /// Label struct, if any, followed by the accessor's `impl` block.
    items: TokenStream,
}

/// Emits the unformatted source for `document`.
pub fn emit(document: &MetricSetDocument) -> String {
    let mut uses = BTreeSet::from([Runtime::Registry, Runtime::Result]);
    let rendered: Vec<Rendered> = document
        .metrics()
        .iter()
        .map(|spec| render_metric(spec, &mut uses))
        .collect();

    let package = format_ident!("{}", document.package());
    let imports = uses.iter().map(|r| r.ident());
    let declarations = rendered.iter().map(|r| &r.declaration);
    let inits = rendered.iter().map(|r| &r.init);
    let registered = rendered.iter().map(|r| &r.field);
    let items = rendered.iter().map(|r| &r.items);
    let unused_registry = rendered.is_empty().then(|| quote!(let _ = registry;));

    quote! {
        pub mod #package {
            #![allow(non_snake_case)]

            use prometheus::{#(#imports),*};

            /// Handle to every declared metric. Obtained from [`register`].
            #[derive(Clone)]
            pub struct Metrics {
                #(#declarations,)*
            }

            /// Creates every declared metric and registers it with `registry`,
            /// in declaration order. Call once at startup.
            pub fn register(registry: &Registry) -> Result<Metrics> {
                #unused_registry
                let metrics = Metrics {
                    #(#inits,)*
                };
                #(registry.register(Box::new(metrics.#registered.clone()))?;)*
                Ok(metrics)
            }

            #(#items)*
        }
    }
    .to_string()
}

/// Emits and canonicalizes `document`, prefixed with the generated-code
/// banner.
pub fn render(document: &MetricSetDocument) -> Result<String, MalformedSource> {
    let raw = emit(document);
    debug!(
        package = document.package(),
        bytes = raw.len(),
        "emitted metrics module"
    );
    Ok(format!("{BANNER}\n{}", canonicalize(&raw)?))
}

fn render_metric(spec: &MetricSpec, uses: &mut BTreeSet<Runtime>) -> Rendered {
    let names = Names::new(spec);
    let shape = spec.shape();
    match shape {
        Shape::Counter => counter(spec, &names, uses),
        Shape::LabeledCounter => labeled_counter(spec, &names, uses),
        Shape::Gauge => gauge(spec, &names, uses),
        Shape::LabeledGauge => labeled_gauge(spec, &names, uses),
        Shape::Histogram => histogram(spec, &names, buckets(spec, shape), uses),
        Shape::LabeledHistogram => labeled_histogram(spec, &names, buckets(spec, shape), uses),
    }
}

fn counter(spec: &MetricSpec, names: &Names, uses: &mut BTreeSet<Runtime>) -> Rendered {
    uses.extend([Runtime::IntCounter, Runtime::Opts]);
    let Names {
        field, accessor, ..
    } = names;
    let opts = opts(spec);
    let doc = doc(spec);

    Rendered {
        field: field.clone(),
        declaration: quote!(#field: IntCounter),
        init: quote!(#field: IntCounter::with_opts(#opts)?),
        items: quote! {
            impl Metrics {
                #doc
                pub fn #accessor(&self) {
                    self.#field.inc();
                }
            }
        },
    }
}

fn labeled_counter(spec: &MetricSpec, names: &Names, uses: &mut BTreeSet<Runtime>) -> Rendered {
    uses.extend([Runtime::IntCounterVec, Runtime::Opts]);
    let Names {
        field,
        labels,
        accessor,
        ..
    } = names;
    let opts = opts(spec);
    let keys = label_keys(spec);
    let values = label_values(names);
    let label_struct = label_struct(spec, names);
    let doc = doc(spec);

    Rendered {
        field: field.clone(),
        declaration: quote!(#field: IntCounterVec),
        init: quote!(#field: IntCounterVec::new(#opts, #keys)?),
        items: quote! {
            #label_struct

            impl Metrics {
                #doc
                pub fn #accessor(&self, labels: #labels<'_>) {
                    self.#field.with_label_values(#values).inc();
                }
            }
        },
    }
}

fn gauge(spec: &MetricSpec, names: &Names, uses: &mut BTreeSet<Runtime>) -> Rendered {
    uses.extend([Runtime::Gauge, Runtime::Opts]);
    let Names {
        field, accessor, ..
    } = names;
    let opts = opts(spec);
    let doc = doc(spec);

    Rendered {
        field: field.clone(),
        declaration: quote!(#field: Gauge),
        init: quote!(#field: Gauge::with_opts(#opts)?),
        items: quote! {
            impl Metrics {
                #doc
                pub fn #accessor(&self, value: f64) {
                    self.#field.set(value);
                }
            }
        },
    }
}

fn labeled_gauge(spec: &MetricSpec, names: &Names, uses: &mut BTreeSet<Runtime>) -> Rendered {
    uses.extend([Runtime::GaugeVec, Runtime::Opts]);
    let Names {
        field,
        labels,
        accessor,
        ..
    } = names;
    let opts = opts(spec);
    let keys = label_keys(spec);
    let values = label_values(names);
    let label_struct = label_struct(spec, names);
    let doc = doc(spec);

    Rendered {
        field: field.clone(),
        declaration: quote!(#field: GaugeVec),
        init: quote!(#field: GaugeVec::new(#opts, #keys)?),
        items: quote! {
            #label_struct

            impl Metrics {
                #doc
                pub fn #accessor(&self, labels: #labels<'_>, value: f64) {
                    self.#field.with_label_values(#values).set(value);
                }
            }
        },
    }
}

fn histogram(
    spec: &MetricSpec,
    names: &Names,
    buckets: &[f64],
    uses: &mut BTreeSet<Runtime>,
) -> Rendered {
    uses.extend([Runtime::Histogram, Runtime::HistogramOpts]);
    let Names {
        field, accessor, ..
    } = names;
    let opts = histogram_opts(spec, buckets);
    let doc = doc(spec);

    Rendered {
        field: field.clone(),
        declaration: quote!(#field: Histogram),
        init: quote!(#field: Histogram::with_opts(#opts)?),
        items: quote! {
            impl Metrics {
                #doc
                pub fn #accessor(&self, value: f64) {
                    self.#field.observe(value);
                }
            }
        },
    }
}

fn labeled_histogram(
    spec: &MetricSpec,
    names: &Names,
    buckets: &[f64],
    uses: &mut BTreeSet<Runtime>,
) -> Rendered {
    uses.extend([Runtime::HistogramVec, Runtime::HistogramOpts]);
    let Names {
        field,
        labels,
        accessor,
        ..
    } = names;
    let opts = histogram_opts(spec, buckets);
    let keys = label_keys(spec);
    let values = label_values(names);
    let label_struct = label_struct(spec, names);
    let doc = doc(spec);

    Rendered {
        field: field.clone(),
        declaration: quote!(#field: HistogramVec),
        init: quote!(#field: HistogramVec::new(#opts, #keys)?),
        items: quote! {
            #label_struct

            impl Metrics {
                #doc
                pub fn #accessor(&self, labels: #labels<'_>, value: f64) {
                    self.#field.with_label_values(#values).observe(value);
                }
            }
        },
    }
}

fn buckets(spec: &MetricSpec, shape: Shape) -> &[f64] {
    match &spec.kind {
        MetricKind::Histogram { buckets } => buckets,
        other => unreachable!("{shape:?} emitted for `{}` of kind {other}", spec.name),
    }
}

/// The runtime rejects empty descriptions, so an empty help falls back to
/// the metric name.
fn description(spec: &MetricSpec) -> &str {
    if spec.help.is_empty() {
        &spec.name
    } else {
        &spec.help
    }
}

fn doc(spec: &MetricSpec) -> Option<TokenStream> {
    (!spec.help.is_empty()).then(|| {
        let doc = format!(" {}", doc_text(&spec.help));
        quote!(#[doc = #doc])
    })
}

/// Doc comments may not contain a bare carriage return, so line endings are
/// folded to `\n` and other control characters are dropped.
fn doc_text(help: &str) -> String {
    help.replace("\r\n", "\n")
        .replace('\r', "\n")
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect()
}

fn opts(spec: &MetricSpec) -> TokenStream {
    let name = &spec.name;
    let help = description(spec);
    quote!(Opts::new(#name, #help))
}

fn histogram_opts(spec: &MetricSpec, buckets: &[f64]) -> TokenStream {
    let name = &spec.name;
    let help = description(spec);
    let bounds = buckets.iter().map(|b| Literal::f64_unsuffixed(*b));
    quote!(HistogramOpts::new(#name, #help).buckets(vec![#(#bounds),*]))
}

fn label_keys(spec: &MetricSpec) -> TokenStream {
    let keys = &spec.labels;
    quote!(&[#(#keys),*])
}

fn label_values(names: &Names) -> TokenStream {
    let fields = &names.label_fields;
    quote!(&[#(labels.#fields),*])
}

fn label_struct(spec: &MetricSpec, names: &Names) -> TokenStream {
    let ty = &names.labels;
    let doc = format!(" Label values for `{}`, in declared order.", spec.name);
    let fields = spec.labels.iter().zip(&names.label_fields).map(|(key, field)| {
        let doc = format!(" Value of the `{key}` label.");
        quote! {
            #[doc = #doc]
            pub #field: &'a str
        }
    });

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct #ty<'a> {
            #(#fields,)*
        }
    }
}
