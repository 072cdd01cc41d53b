//! X11 window collaborator.
//!
//! Standalone platform-window lifecycle (connect, create, map, teardown).
//! Deliberately not wired into the enumeration pipeline; surface creation is
//! an external concern the report does not depend on.

use thiserror::Error;
use xcb::{x, Connection};

/// Errors from the display-server collaborator.
#[derive(Debug, Error)]
pub enum WindowError {
    #[error("failed to connect to the display server: {0}")]
    Connect(String),

    #[error("display has no usable screen")]
    NoScreen,

    #[error("window request failed: {0}")]
    Protocol(String),
}

/// A mapped platform window and its display connection.
///
/// The window is destroyed and the connection flushed on drop.
pub struct PlatformWindow {
    conn: Connection,
    window: x::Window,
}

impl PlatformWindow {
    /// Connect to the default display, create a window of the given size,
    /// and map it.
    pub fn create(width: u16, height: u16) -> Result<Self, WindowError> {
        let (conn, screen_num) =
            Connection::connect(None).map_err(|e| WindowError::Connect(e.to_string()))?;

        let setup = conn.get_setup();
        let screen =
            setup.roots().nth(screen_num as usize).ok_or(WindowError::NoScreen)?;

        let window: x::Window = conn.generate_id();
        conn.send_and_check_request(&x::CreateWindow {
            depth: x::COPY_FROM_PARENT as u8,
            wid: window,
            parent: screen.root(),
            x: 25,
            y: 25,
            width,
            height,
            border_width: 5,
            class: x::WindowClass::InputOutput,
            visual: screen.root_visual(),
            value_list: &[],
        })
        .map_err(|e| WindowError::Protocol(e.to_string()))?;

        conn.send_and_check_request(&x::MapWindow { window })
            .map_err(|e| WindowError::Protocol(e.to_string()))?;

        Ok(Self { conn, window })
    }

    /// The raw window id.
    pub fn window(&self) -> x::Window {
        self.window
    }

    /// The underlying display connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for PlatformWindow {
    fn drop(&mut self) {
        self.conn.send_request(&x::DestroyWindow { window: self.window });
        let _ = self.conn.flush();
    }
}
