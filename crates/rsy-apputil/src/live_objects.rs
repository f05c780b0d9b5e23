//! Leak audit for engine objects that should be gone after a session ends.
//!
//! The first audit that finds anything logs it and latches; later audits
//! stay quiet so one leak does not flood the log for the rest of the run.

use tracing::error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ObjectKind {
    Session,
    Activity,
    Actor,
}

/// One object still alive at audit time, as described by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveObject {
    pub kind: ObjectKind,
    pub name: String,
    /// Engine node attached to an actor, if any (`"<type>; <name>"`).
    pub node: Option<String>,
}

impl LiveObject {
    pub fn new(kind: ObjectKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            node: None,
        }
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeakReport {
    pub when: String,
    pub object: LiveObject,
}

#[derive(Clone, Debug, Default)]
pub struct LiveObjectAudit {
    warned: bool,
}

impl LiveObjectAudit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report every object in `objects` except the ignored session/activity.
    ///
    /// Reports are ordered sessions, activities, then actors. Returns an
    /// empty list once a previous audit has already reported a leak.
    pub fn audit(
        &mut self,
        when: &str,
        objects: &[LiveObject],
        ignore_session: Option<&str>,
        ignore_activity: Option<&str>,
    ) -> Vec<LeakReport> {
        if self.warned {
            return Vec::new();
        }

        let mut leaked: Vec<&LiveObject> = objects
            .iter()
            .filter(|o| match o.kind {
                ObjectKind::Session => ignore_session != Some(o.name.as_str()),
                ObjectKind::Activity => ignore_activity != Some(o.name.as_str()),
                ObjectKind::Actor => true,
            })
            .collect();
        leaked.sort_by_key(|o| o.kind);

        let reports: Vec<LeakReport> = leaked
            .into_iter()
            .map(|o| {
                error!(kind = ?o.kind, name = %o.name, node = ?o.node, %when, "live object found");
                LeakReport {
                    when: when.to_string(),
                    object: o.clone(),
                }
            })
            .collect();

        if !reports.is_empty() {
            self.warned = true;
        }
        reports
    }

    /// A leak has been reported during this run.
    pub fn has_warned(&self) -> bool {
        self.warned
    }
}
