//! Trace model: an ordered, replayable log of algorithm-internal events.
//!
//! Events carry a logical sequence number (never wall-clock time), so the
//! same run always yields the same bytes.
//!
//! # Line format (`2.0`)
//!
//! ```text
//! {"algorithm":"astar","dropped_events":0,"event_count":N,"source_id":"...","trace_schema":"2.0","truncated":false,"type":"header"}
//! {"depth":0,"g":0.0,"seq":0,"state":"0","type":"expand"}
//! {"action":"\"step\"","cost":1.0,"from":"0","seq":1,"to":"1","type":"generate_edge"}
//! ...
//! ```
//!
//! Every line is canonical JSON (see [`crate::proof::canon`]).

use crate::proof::canon::{canonical_json_bytes, finite_number, CanonError};
use crate::proof::hash::{canonical_hash, ContentHash, HashDomain};
use crate::result::Algorithm;
use crate::schema::{is_compatible, TRACE_SCHEMA_VERSION};

/// Render a state or action as its `Debug` label.
///
/// Labels are what traces and result records carry; engines never inspect
/// state structure beyond this.
#[must_use]
pub fn debug_label<T: std::fmt::Debug + ?Sized>(value: &T) -> String {
    format!("{value:?}")
}

/// Trace collection options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceOptions {
    /// Collect a trace at all.
    pub enabled: bool,
    /// Include `generate_edge` events (the bulk of a search trace).
    pub record_edges: bool,
    /// Stop recording after this many events.
    pub max_events: Option<u64>,
}

impl TraceOptions {
    /// Tracing switched off.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            record_edges: false,
            max_events: None,
        }
    }

    /// Full tracing, edges included, no cap.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            enabled: true,
            record_edges: true,
            max_events: None,
        }
    }

    #[must_use]
    pub const fn with_max_events(mut self, max_events: u64) -> Self {
        self.max_events = Some(max_events);
        self
    }
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Event discriminant with a stable serialized name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEventKind {
    Expand,
    GenerateEdge,
    GoalFound,
    IterationSweep,
}

impl TraceEventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expand => "expand",
            Self::GenerateEdge => "generate_edge",
            Self::GoalFound => "goal_found",
            Self::IterationSweep => "iteration_sweep",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "expand" => Some(Self::Expand),
            "generate_edge" => Some(Self::GenerateEdge),
            "goal_found" => Some(Self::GoalFound),
            "iteration_sweep" => Some(Self::IterationSweep),
            _ => None,
        }
    }
}

/// Payload of a trace event. States and actions are `Debug` labels.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEventBody {
    /// A node was popped and expanded.
    Expand { state: String, g: f64, depth: u32 },
    /// The problem produced a successor edge.
    GenerateEdge {
        from: String,
        to: String,
        action: String,
        cost: f64,
    },
    /// A goal node was popped; the search terminates.
    GoalFound { state: String, cost: f64 },
    /// One full sweep (value iteration) or round (policy iteration).
    IterationSweep {
        iteration: u64,
        delta: f64,
        values: Vec<(String, f64)>,
        policy: Vec<(String, String)>,
    },
}

impl TraceEventBody {
    #[must_use]
    pub fn kind(&self) -> TraceEventKind {
        match self {
            Self::Expand { .. } => TraceEventKind::Expand,
            Self::GenerateEdge { .. } => TraceEventKind::GenerateEdge,
            Self::GoalFound { .. } => TraceEventKind::GoalFound,
            Self::IterationSweep { .. } => TraceEventKind::IterationSweep,
        }
    }
}

/// A sequenced trace event.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent {
    /// Logical timestamp: 0, 1, 2, ... in recording order.
    pub seq: u64,
    pub body: TraceEventBody,
}

/// Accumulates events during a run.
///
/// When disabled, [`TraceRecorder::record_with`] never evaluates its closure,
/// so label formatting costs nothing on untraced runs.
#[derive(Debug)]
pub struct TraceRecorder {
    options: TraceOptions,
    events: Vec<TraceEvent>,
    dropped: u64,
}

impl TraceRecorder {
    #[must_use]
    pub fn new(options: TraceOptions) -> Self {
        Self {
            options,
            events: Vec::new(),
            dropped: 0,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.options.enabled
    }

    #[must_use]
    pub fn records_edges(&self) -> bool {
        self.options.enabled && self.options.record_edges
    }

    /// Record an event built lazily by `build`.
    pub fn record_with(&mut self, build: impl FnOnce() -> TraceEventBody) {
        if !self.options.enabled {
            return;
        }
        if self
            .options
            .max_events
            .is_some_and(|cap| self.events.len() as u64 >= cap)
        {
            self.dropped += 1;
            return;
        }
        let seq = self.events.len() as u64;
        self.events.push(TraceEvent { seq, body: build() });
    }

    /// Number of events recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Close the recorder. Returns `None` when tracing was disabled.
    #[must_use]
    pub fn finish(self, algorithm: Algorithm, source_id: &str) -> Option<Trace> {
        if !self.options.enabled {
            return None;
        }
        Some(Trace {
            schema_version: TRACE_SCHEMA_VERSION.to_string(),
            algorithm,
            source_id: source_id.to_string(),
            truncated: self.dropped > 0,
            dropped_events: self.dropped,
            events: self.events,
        })
    }
}

/// A completed trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub schema_version: String,
    pub algorithm: Algorithm,
    /// Identifier of the problem or MDP instance that was solved.
    pub source_id: String,
    pub events: Vec<TraceEvent>,
    /// Whether `max_events` cut the trace short.
    pub truncated: bool,
    pub dropped_events: u64,
}

/// Errors reading a line-delimited trace.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceParseError {
    #[error("line {line}: invalid JSON: {detail}")]
    Json { line: usize, detail: String },
    #[error("trace is empty or does not start with a header line")]
    MissingHeader,
    #[error("unsupported trace schema {found}")]
    UnsupportedSchema { found: String },
    #[error("line {line}: missing or mistyped field `{field}`")]
    MissingField { line: usize, field: &'static str },
    #[error("line {line}: unknown event type {kind}")]
    UnknownEventKind { line: usize, kind: String },
    #[error("line {line}: unknown algorithm {name}")]
    UnknownAlgorithm { line: usize, name: String },
    #[error("line {line}: expected seq {expected}, found {found}")]
    SequenceGap {
        line: usize,
        expected: u64,
        found: u64,
    },
    #[error("header declares {declared} events, found {found}")]
    EventCountMismatch { declared: u64, found: u64 },
}

impl Trace {
    /// Events of one kind, in sequence order.
    pub fn events_of_kind(&self, kind: TraceEventKind) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(move |e| e.body.kind() == kind)
    }

    /// Serialize as line-delimited canonical JSON (header first).
    ///
    /// # Errors
    ///
    /// Returns [`CanonError::NonFiniteNumber`] if an event carries NaN or an
    /// infinity (engines never record such values).
    pub fn to_jsonl_bytes(&self) -> Result<Vec<u8>, CanonError> {
        let mut out = canonical_json_bytes(&self.header_json());
        out.push(b'\n');
        for event in &self.events {
            out.extend_from_slice(&canonical_json_bytes(&event_to_json(event)?));
            out.push(b'\n');
        }
        Ok(out)
    }

    /// Digest of the line-delimited form.
    ///
    /// # Errors
    ///
    /// Same as [`Trace::to_jsonl_bytes`].
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        Ok(canonical_hash(HashDomain::TraceStream, &self.to_jsonl_bytes()?))
    }

    fn header_json(&self) -> serde_json::Value {
        serde_json::json!({
            "algorithm": self.algorithm.as_str(),
            "dropped_events": self.dropped_events,
            "event_count": self.events.len() as u64,
            "source_id": self.source_id,
            "trace_schema": self.schema_version,
            "truncated": self.truncated,
            "type": "header",
        })
    }

    /// Parse the line-delimited form produced by [`Trace::to_jsonl_bytes`].
    ///
    /// # Errors
    ///
    /// Returns a [`TraceParseError`] describing the first malformed line.
    pub fn from_jsonl_bytes(bytes: &[u8]) -> Result<Self, TraceParseError> {
        let text = std::str::from_utf8(bytes).map_err(|e| TraceParseError::Json {
            line: 1,
            detail: e.to_string(),
        })?;
        let mut lines = text.lines().enumerate().filter(|(_, l)| !l.is_empty());

        let (_, header_line) = lines.next().ok_or(TraceParseError::MissingHeader)?;
        let header = parse_line(1, header_line)?;
        if header.get("type").and_then(serde_json::Value::as_str) != Some("header") {
            return Err(TraceParseError::MissingHeader);
        }
        let schema_version = str_field(&header, 1, "trace_schema")?.to_string();
        if !is_compatible(&schema_version, TRACE_SCHEMA_VERSION) {
            return Err(TraceParseError::UnsupportedSchema {
                found: schema_version,
            });
        }
        let algo_name = str_field(&header, 1, "algorithm")?;
        let algorithm =
            Algorithm::parse(algo_name).ok_or_else(|| TraceParseError::UnknownAlgorithm {
                line: 1,
                name: algo_name.to_string(),
            })?;
        let declared = u64_field(&header, 1, "event_count")?;

        let mut events = Vec::new();
        for (idx, raw) in lines {
            let line = idx + 1;
            let value = parse_line(line, raw)?;
            let event = event_from_json(line, &value)?;
            let expected = events.len() as u64;
            if event.seq != expected {
                return Err(TraceParseError::SequenceGap {
                    line,
                    expected,
                    found: event.seq,
                });
            }
            events.push(event);
        }
        if declared != events.len() as u64 {
            return Err(TraceParseError::EventCountMismatch {
                declared,
                found: events.len() as u64,
            });
        }

        Ok(Self {
            schema_version,
            algorithm,
            source_id: str_field(&header, 1, "source_id")?.to_string(),
            events,
            truncated: header
                .get("truncated")
                .and_then(serde_json::Value::as_bool)
                .ok_or(TraceParseError::MissingField {
                    line: 1,
                    field: "truncated",
                })?,
            dropped_events: u64_field(&header, 1, "dropped_events")?,
        })
    }
}

fn event_to_json(event: &TraceEvent) -> Result<serde_json::Value, CanonError> {
    let mut obj = match &event.body {
        TraceEventBody::Expand { state, g, depth } => serde_json::json!({
            "depth": depth,
            "g": finite_number(*g)?,
            "state": state,
        }),
        TraceEventBody::GenerateEdge {
            from,
            to,
            action,
            cost,
        } => serde_json::json!({
            "action": action,
            "cost": finite_number(*cost)?,
            "from": from,
            "to": to,
        }),
        TraceEventBody::GoalFound { state, cost } => serde_json::json!({
            "cost": finite_number(*cost)?,
            "state": state,
        }),
        TraceEventBody::IterationSweep {
            iteration,
            delta,
            values,
            policy,
        } => {
            let values = values
                .iter()
                .map(|(s, v)| Ok(serde_json::json!({"state": s, "value": finite_number(*v)?})))
                .collect::<Result<Vec<_>, CanonError>>()?;
            let policy: Vec<serde_json::Value> = policy
                .iter()
                .map(|(s, a)| serde_json::json!({"action": a, "state": s}))
                .collect();
            serde_json::json!({
                "delta": finite_number(*delta)?,
                "iteration": iteration,
                "policy": policy,
                "values": values,
            })
        }
    };
    obj["seq"] = serde_json::json!(event.seq);
    obj["type"] = serde_json::json!(event.body.kind().as_str());
    Ok(obj)
}

fn event_from_json(line: usize, v: &serde_json::Value) -> Result<TraceEvent, TraceParseError> {
    let kind_name = str_field(v, line, "type")?;
    let kind = TraceEventKind::parse(kind_name).ok_or_else(|| TraceParseError::UnknownEventKind {
        line,
        kind: kind_name.to_string(),
    })?;
    let seq = u64_field(v, line, "seq")?;
    let body = match kind {
        TraceEventKind::Expand => TraceEventBody::Expand {
            state: str_field(v, line, "state")?.to_string(),
            g: f64_field(v, line, "g")?,
            depth: u32::try_from(u64_field(v, line, "depth")?).map_err(|_| {
                TraceParseError::MissingField {
                    line,
                    field: "depth",
                }
            })?,
        },
        TraceEventKind::GenerateEdge => TraceEventBody::GenerateEdge {
            from: str_field(v, line, "from")?.to_string(),
            to: str_field(v, line, "to")?.to_string(),
            action: str_field(v, line, "action")?.to_string(),
            cost: f64_field(v, line, "cost")?,
        },
        TraceEventKind::GoalFound => TraceEventBody::GoalFound {
            state: str_field(v, line, "state")?.to_string(),
            cost: f64_field(v, line, "cost")?,
        },
        TraceEventKind::IterationSweep => {
            let values = array_field(v, line, "values")?
                .iter()
                .map(|entry| {
                    Ok((
                        str_field(entry, line, "state")?.to_string(),
                        f64_field(entry, line, "value")?,
                    ))
                })
                .collect::<Result<Vec<_>, TraceParseError>>()?;
            let policy = array_field(v, line, "policy")?
                .iter()
                .map(|entry| {
                    Ok((
                        str_field(entry, line, "state")?.to_string(),
                        str_field(entry, line, "action")?.to_string(),
                    ))
                })
                .collect::<Result<Vec<_>, TraceParseError>>()?;
            TraceEventBody::IterationSweep {
                iteration: u64_field(v, line, "iteration")?,
                delta: f64_field(v, line, "delta")?,
                values,
                policy,
            }
        }
    };
    Ok(TraceEvent { seq, body })
}

fn parse_line(line: usize, raw: &str) -> Result<serde_json::Value, TraceParseError> {
    serde_json::from_str(raw).map_err(|e| TraceParseError::Json {
        line,
        detail: e.to_string(),
    })
}

fn str_field<'a>(
    v: &'a serde_json::Value,
    line: usize,
    field: &'static str,
) -> Result<&'a str, TraceParseError> {
    v.get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or(TraceParseError::MissingField { line, field })
}

fn u64_field(v: &serde_json::Value, line: usize, field: &'static str) -> Result<u64, TraceParseError> {
    v.get(field)
        .and_then(serde_json::Value::as_u64)
        .ok_or(TraceParseError::MissingField { line, field })
}

fn f64_field(v: &serde_json::Value, line: usize, field: &'static str) -> Result<f64, TraceParseError> {
    v.get(field)
        .and_then(serde_json::Value::as_f64)
        .ok_or(TraceParseError::MissingField { line, field })
}

fn array_field<'a>(
    v: &'a serde_json::Value,
    line: usize,
    field: &'static str,
) -> Result<&'a Vec<serde_json::Value>, TraceParseError> {
    v.get(field)
        .and_then(serde_json::Value::as_array)
        .ok_or(TraceParseError::MissingField { line, field })
}
