/// Which main view the presentation layer shows. State-machine shape only;
/// rendering lives outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Welcome,
    Collections,
    History,
    Environments,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelKind {
    Sidebar,
    RequestList,
    RequestEditor,
    ResponseViewer,
    Tabs,
    #[default]
    General,
}

/// Ephemeral context-menu state consumed by the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct ContextMenuState {
    pub visible: bool,
    pub x: i32,
    pub y: i32,
    pub target_id: Option<String>,
    pub panel: PanelKind,
}

impl ContextMenuState {
    pub fn show(&mut self, x: i32, y: i32, target_id: Option<String>, panel: PanelKind) {
        self.visible = true;
        self.x = x;
        self.y = y;
        self.target_id = target_id;
        self.panel = panel;
    }

    /// Hiding keeps position and target so a dismiss animation can read them.
    pub fn hide(&mut self) {
        self.visible = false;
    }
}
