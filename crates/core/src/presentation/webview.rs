//! JSON message protocol between the host and the webview panel.
//!
//! Messages are internally tagged with a `command` field, e.g.
//! `{"command":"targetSelected","target":"Stax"}`. The [`WebviewBridge`]
//! answers every view message with the host messages the panel needs to
//! redraw.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::container::{ContainerMonitor, ContainerRuntime, ContainerStatus, DockerCli};
use crate::session::Session;
use crate::target::TargetRegistry;
use crate::tasks::{TaskGroup, TaskState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppEntry {
    pub name: String,
    pub folder_name: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEntry {
    pub name: String,
    pub label: String,
    pub group: String,
    pub tooltip: String,
    pub enabled: bool,
}

/// Host to view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostMessage {
    AddApps {
        apps: Vec<AppEntry>,
        selected: Option<String>,
    },
    AddTargets {
        targets: Vec<String>,
        selected: String,
    },
    AddBuildUseCases {
        use_cases: Vec<String>,
        selected: String,
    },
    AddVariants {
        param: Option<String>,
        values: Vec<String>,
        selected: Option<String>,
    },
    AddTasks {
        tasks: Vec<TaskEntry>,
    },
    ContainerStatus {
        status: ContainerStatus,
    },
    Warning {
        message: String,
    },
    /// Shell line the host should run in a terminal
    RunTask {
        task: String,
        shell_line: String,
    },
}

/// View to host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ViewMessage {
    WebviewReady,
    ExecuteTask { task: String },
    AppSelected { app: String },
    TargetSelected { target: String },
    BuildUseCaseSelected { use_case: String },
    VariantSelected { variant: String },
    TestDependenciesUpdated { dependencies: String },
    RefreshContainerStatus,
}

pub struct WebviewBridge<R: ContainerRuntime = DockerCli> {
    session: Session,
    monitor: ContainerMonitor<R>,
}

impl<R: ContainerRuntime> WebviewBridge<R> {
    pub fn new(session: Session, monitor: ContainerMonitor<R>) -> Self {
        Self { session, monitor }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Apply `message` to the session and return the messages to post back.
    /// Warnings the session raised on its own, e.g. a saved device that
    /// had to be replaced, come first.
    pub fn handle(&mut self, message: ViewMessage) -> Vec<HostMessage> {
        debug!("Webview message: {:?}", message);
        let mut messages: Vec<HostMessage> = self
            .session
            .take_warnings()
            .into_iter()
            .map(warning_message)
            .collect();
        messages.extend(self.dispatch(message));
        messages
    }

    fn dispatch(&mut self, message: ViewMessage) -> Vec<HostMessage> {
        match message {
            ViewMessage::WebviewReady => self.full_state(),
            ViewMessage::ExecuteTask { task } => vec![self.run_task(&task)],
            ViewMessage::AppSelected { app } => match self.session.select_app(&app) {
                Ok(warning) => {
                    self.persist();
                    let mut messages: Vec<HostMessage> = warning.map(warning_message).into_iter().collect();
                    messages.extend(self.full_state());
                    messages
                }
                Err(e) => vec![warning_message(e.to_string())],
            },
            ViewMessage::TargetSelected { target } => match self.session.select_target(&target) {
                Ok(selection) => {
                    self.persist();
                    let mut messages: Vec<HostMessage> =
                        selection.warning.map(warning_message).into_iter().collect();
                    messages.push(self.targets());
                    messages.push(self.tasks());
                    messages
                }
                Err(e) => vec![warning_message(e.to_string()), self.targets()],
            },
            ViewMessage::BuildUseCaseSelected { use_case } => {
                match self.session.select_build_use_case(&use_case) {
                    Ok(()) => {
                        self.persist();
                        vec![self.build_use_cases(), self.tasks()]
                    }
                    Err(e) => vec![warning_message(e.to_string()), self.build_use_cases()],
                }
            }
            ViewMessage::VariantSelected { variant } => match self.session.select_variant(&variant) {
                Ok(()) => {
                    self.persist();
                    vec![self.variants()]
                }
                Err(e) => vec![warning_message(e.to_string()), self.variants()],
            },
            ViewMessage::TestDependenciesUpdated { dependencies } => {
                match self.session.set_test_dependencies(&dependencies) {
                    Ok(()) => {
                        self.persist();
                        Vec::new()
                    }
                    Err(e) => vec![warning_message(e.to_string())],
                }
            }
            ViewMessage::RefreshContainerStatus => self.container_status(),
        }
    }

    /// Everything the panel shows, in display order
    pub fn full_state(&self) -> Vec<HostMessage> {
        let mut messages = vec![
            self.apps(),
            self.targets(),
            self.build_use_cases(),
            self.variants(),
            self.tasks(),
        ];
        messages.extend(self.container_status());
        messages
    }

    fn apps(&self) -> HostMessage {
        HostMessage::AddApps {
            apps: self
                .session
                .apps()
                .iter()
                .map(|app| AppEntry {
                    name: app.name.clone(),
                    folder_name: app.folder_name.clone(),
                    language: app.language.as_str().to_string(),
                })
                .collect(),
            selected: self.session.current_app().map(|a| a.folder_name.clone()),
        }
    }

    fn targets(&self) -> HostMessage {
        HostMessage::AddTargets {
            targets: TargetRegistry::available_targets(self.session.current_app())
                .into_iter()
                .map(|t| t.to_string())
                .collect(),
            selected: self.session.selected_target().to_string(),
        }
    }

    fn build_use_cases(&self) -> HostMessage {
        HostMessage::AddBuildUseCases {
            use_cases: self
                .session
                .current_app()
                .map(|app| app.build_use_cases.iter().map(|u| u.name.clone()).collect())
                .unwrap_or_default(),
            selected: self.session.build_use_case(),
        }
    }

    fn variants(&self) -> HostMessage {
        let variants = self.session.current_app().and_then(|app| app.variants.as_ref());
        HostMessage::AddVariants {
            param: variants.map(|v| v.param.clone()),
            values: variants.map(|v| v.values.clone()).unwrap_or_default(),
            selected: self.session.selections().variant,
        }
    }

    fn tasks(&self) -> HostMessage {
        let catalog = self.session.catalog();
        let tasks = TaskGroup::ALL
            .into_iter()
            .flat_map(|group| catalog.in_group(group))
            .filter(|task| task.state != TaskState::Unavailable)
            .map(|task| TaskEntry {
                name: task.name.to_string(),
                label: self.session.task_label(task),
                group: task.group.label().to_string(),
                tooltip: task.tooltip.to_string(),
                enabled: task.state == TaskState::Enabled,
            })
            .collect();
        HostMessage::AddTasks { tasks }
    }

    /// Poll the container; a missing or dead container also yields the
    /// recreation command.
    fn container_status(&self) -> Vec<HostMessage> {
        let Some(app) = self.session.current_app() else {
            return Vec::new();
        };
        let poll = self.monitor.poll(&app.container_name);
        let mut messages = vec![HostMessage::ContainerStatus {
            status: poll.status,
        }];
        if poll.needs_recreate {
            messages.push(self.run_task(crate::tasks::UPDATE_CONTAINER));
        }
        messages
    }

    fn run_task(&self, task: &str) -> HostMessage {
        match self.session.command_for(task) {
            Ok(command) if command.is_empty() => warning_message("No app selected".to_string()),
            Ok(command) => HostMessage::RunTask {
                task: task.to_string(),
                shell_line: command,
            },
            Err(e) => warning_message(e.to_string()),
        }
    }

    fn persist(&self) {
        if let Err(e) = self.session.save() {
            warn!("Failed to save selections: {}", e);
        }
    }
}

fn warning_message(message: String) -> HostMessage {
    HostMessage::Warning { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::HostPlatform;
    use crate::config::Config;
    use crate::scan::AppRegistry;
    use crate::types::{App, Device, Language};
    use std::io;
    use std::path::Path;

    struct FixedRuntime(Option<&'static str>);

    impl ContainerRuntime for FixedRuntime {
        fn list_containers(&self, name: &str) -> io::Result<Vec<String>> {
            Ok(self.0.map(|_| vec![name.to_string()]).unwrap_or_default())
        }

        fn inspect_state(&self, _name: &str) -> io::Result<String> {
            Ok(self.0.unwrap_or("exited").to_string())
        }
    }

    fn bridge(state: Option<&'static str>) -> WebviewBridge<FixedRuntime> {
        let mut app = App::new("Boilerplate", Path::new("/ws/app-boilerplate"), Language::C);
        app.compatible_devices = vec![Device::NanoX, Device::Stax];
        let session = Session::new(
            Config::default(),
            HostPlatform::Linux,
            AppRegistry::from_apps(vec![app]),
        );
        WebviewBridge::new(session, ContainerMonitor::new(FixedRuntime(state)))
    }

    #[test]
    fn test_view_message_wire_format() {
        let msg: ViewMessage =
            serde_json::from_str(r#"{"command":"buildUseCaseSelected","useCase":"debug"}"#).unwrap();
        assert_eq!(
            msg,
            ViewMessage::BuildUseCaseSelected {
                use_case: "debug".to_string()
            }
        );
        let msg: ViewMessage = serde_json::from_str(r#"{"command":"webviewReady"}"#).unwrap();
        assert_eq!(msg, ViewMessage::WebviewReady);

        let json = serde_json::to_value(HostMessage::ContainerStatus {
            status: ContainerStatus::Syncing,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"command": "containerStatus", "status": "syncing"}));
    }

    #[test]
    fn test_run_task_wire_format() {
        let message = HostMessage::RunTask {
            task: "Build".to_string(),
            shell_line: "docker exec -it app-container bash -c 'make -j'".to_string(),
        };
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(
            json,
            r#"{"command":"runTask","task":"Build","shellLine":"docker exec -it app-container bash -c 'make -j'"}"#
        );
        let back: HostMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_restore_warnings_are_posted_first() {
        let mut app = App::new("Boilerplate", Path::new("/ws/app-boilerplate"), Language::C);
        app.compatible_devices = vec![Device::Stax];
        let mut config = Config::default();
        config.app_settings_mut("app-boilerplate").selected_device = Some("Nano X".to_string());
        let session = Session::new(
            config,
            HostPlatform::Linux,
            AppRegistry::from_apps(vec![app]),
        );
        let mut bridge = WebviewBridge::new(session, ContainerMonitor::new(FixedRuntime(Some("running"))));

        let messages = bridge.handle(ViewMessage::WebviewReady);
        assert!(matches!(&messages[0], HostMessage::Warning { message } if message.contains("selecting Stax")));
        assert!(matches!(&messages[1], HostMessage::AddApps { .. }));

        let messages = bridge.handle(ViewMessage::WebviewReady);
        assert!(matches!(&messages[0], HostMessage::AddApps { .. }));
    }

    #[test]
    fn test_ready_sends_full_state() {
        let mut bridge = bridge(Some("running"));
        let messages = bridge.handle(ViewMessage::WebviewReady);
        assert_eq!(messages.len(), 6);
        assert_eq!(
            messages[1],
            HostMessage::AddTargets {
                targets: vec!["Nano X".to_string(), "Stax".to_string(), "All".to_string()],
                selected: "Nano X".to_string(),
            }
        );
        assert_eq!(
            messages[5],
            HostMessage::ContainerStatus {
                status: ContainerStatus::Running
            }
        );
    }

    #[test]
    fn test_missing_container_requests_recreation() {
        let mut bridge = bridge(None);
        let messages = bridge.handle(ViewMessage::RefreshContainerStatus);
        assert_eq!(messages.len(), 2);
        match &messages[1] {
            HostMessage::RunTask { task, shell_line } => {
                assert_eq!(task, "Update container");
                assert!(shell_line.starts_with("docker rm -f app-boilerplate-container ; docker pull"));
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn test_target_selection_warns_on_fallback() {
        let mut bridge = bridge(Some("running"));
        let messages = bridge.handle(ViewMessage::TargetSelected {
            target: "Flex".to_string(),
        });
        assert!(matches!(&messages[0], HostMessage::Warning { message } if message.contains("selecting Nano X")));
        assert_eq!(bridge.session().selected_target().to_string(), "Nano X");

        let messages = bridge.handle(ViewMessage::TargetSelected {
            target: "Nano Q".to_string(),
        });
        assert!(matches!(&messages[0], HostMessage::Warning { .. }));
    }

    #[test]
    fn test_execute_disabled_task_warns() {
        let mut bridge = bridge(Some("running"));
        // Nano X does not accept sideloading
        let messages = bridge.handle(ViewMessage::ExecuteTask {
            task: "Load app on device".to_string(),
        });
        assert!(matches!(&messages[0], HostMessage::Warning { message } if message.contains("disabled")));

        let messages = bridge.handle(ViewMessage::ExecuteTask {
            task: "Build".to_string(),
        });
        assert!(matches!(&messages[0], HostMessage::RunTask { .. }));
    }

    #[test]
    fn test_test_dependencies_are_stored() {
        let mut bridge = bridge(Some("running"));
        let messages = bridge.handle(ViewMessage::TestDependenciesUpdated {
            dependencies: "apt-get install -y qemu-user-static".to_string(),
        });
        assert!(messages.is_empty());
        assert_eq!(
            bridge.session().config().additional_deps("app-boilerplate"),
            Some("apt-get install -y qemu-user-static")
        );
    }
}
