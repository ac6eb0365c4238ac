//! Node labels and taints applied during cluster init.

use armada_remote::{CommandSpec, Session};

use crate::error::K8sError;

fn label_or_taint(
    session: &Session,
    verb: &str,
    node: &str,
    entries: &[String],
) -> Result<(), K8sError> {
    let cmd = CommandSpec::new("kubectl")
        .arg(verb)
        .arg("--overwrite=true")
        .arg("node")
        .arg(node)
        .args(entries.iter().cloned());
    session.run(&cmd).map(|_| ()).map_err(K8sError::from)
}

/// Apply `key=value` labels to `node`, overwriting existing values.
pub fn label(session: &Session, node: &str, labels: &[String]) -> Result<(), K8sError> {
    label_or_taint(session, "label", node, labels)
}

/// Apply `key=value:Effect` taints to `node`, overwriting existing values.
pub fn taint(session: &Session, node: &str, taints: &[String]) -> Result<(), K8sError> {
    label_or_taint(session, "taint", node, taints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use armada_remote::{ExecOutput, Executor, RunOptions};
    use std::sync::{Arc, Mutex};

    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Executor for Recorder {
        fn run(&self, command: &CommandSpec) -> std::io::Result<ExecOutput> {
            self.0.lock().expect("lock").push(command.display());
            Ok(ExecOutput {
                code: Some(0),
                ..ExecOutput::default()
            })
        }
    }

    #[test]
    fn label_command_shape() {
        let executed = Arc::new(Mutex::new(Vec::new()));
        let session = Session::new(
            Box::new(Recorder(Arc::clone(&executed))),
            RunOptions::default(),
        );
        label(&session, "worker-1", &["keel.manager=true".to_string()]).expect("label");
        assert_eq!(
            executed.lock().expect("lock")[0],
            "kubectl label --overwrite=true node worker-1 keel.manager=true"
        );
    }
}
