use crate::{
    utils::formatting::format_panel,
    view::cart_panel::{PanelFrame, PanelRenderer},
};

/// Draws panel frames on stdout. Hidden frames print nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalRenderer;

impl PanelRenderer for TerminalRenderer {
    fn render(&self, frame: &PanelFrame) {
        let output = format_panel(frame);
        if !output.is_empty() {
            println!("{}", output);
        }
    }
}
