// whisper-relay - platform/window.rs
//
// Game window focus and keystroke synthesis.
//
// The game window is found by title-substring match over visible top-level
// windows, restored if minimised, and brought to the foreground before any
// input is synthesized. Focus requests are idempotent and order-insensitive
// (last request wins at the OS level), so the tail thread and the keepalive
// thread each hold their own `ClientWindow` with no coordination.
//
// All failures are typed (`AutomationError`) so callers can tell a missing
// window from a denied focus from an OS-rejected input batch.
//
// Only the Windows implementation synthesizes input; other platforms
// compile and report `Unsupported`.

use crate::util::constants::WINDOW_TITLE_FRAGMENT;
use crate::util::error::AutomationError;

/// Input operations against the monitored game client — the narrow seam
/// between the app layer and the OS window/input interface.
pub trait GameAutomation {
    /// Bring the game window forward and tap the anti-AFK key.
    fn anti_idle_tap(&self) -> Result<(), AutomationError>;

    /// Bring the game window forward and submit `text` as one chat line:
    /// open the chat input, clear it, type the text verbatim, commit.
    fn send_chat_line(&self, text: &str) -> Result<(), AutomationError>;
}

/// The running Path of Exile client window, addressed by title substring.
#[derive(Debug, Clone)]
pub struct ClientWindow {
    title_fragment: &'static str,
}

impl ClientWindow {
    pub fn new() -> Self {
        Self {
            title_fragment: WINDOW_TITLE_FRAGMENT,
        }
    }
}

impl Default for ClientWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(windows)]
impl GameAutomation for ClientWindow {
    fn anti_idle_tap(&self) -> Result<(), AutomationError> {
        use crate::util::constants::KEEPALIVE_KEY;

        let hwnd = win::find_window(self.title_fragment)?;
        win::focus(hwnd)?;
        win::type_text(&KEEPALIVE_KEY.to_string())
    }

    fn send_chat_line(&self, text: &str) -> Result<(), AutomationError> {
        use crate::util::constants::CHAT_CLEAR_BACKSPACES;

        let hwnd = win::find_window(self.title_fragment)?;
        win::focus(hwnd)?;

        // Enter opens the chat input; clear any stale content before typing.
        win::tap_enter()?;
        for _ in 0..CHAT_CLEAR_BACKSPACES {
            win::tap_backspace()?;
        }
        win::type_text(text)?;
        win::tap_enter()
    }
}

#[cfg(not(windows))]
impl GameAutomation for ClientWindow {
    fn anti_idle_tap(&self) -> Result<(), AutomationError> {
        tracing::debug!(
            window = self.title_fragment,
            "Input synthesis unavailable on this platform"
        );
        Err(AutomationError::Unsupported)
    }

    fn send_chat_line(&self, _text: &str) -> Result<(), AutomationError> {
        tracing::debug!(
            window = self.title_fragment,
            "Input synthesis unavailable on this platform"
        );
        Err(AutomationError::Unsupported)
    }
}

#[cfg(windows)]
mod win {
    use crate::util::error::AutomationError;
    use windows::Win32::Foundation::{BOOL, HWND, LPARAM, TRUE};
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS,
        KEYEVENTF_KEYUP, KEYEVENTF_UNICODE, VIRTUAL_KEY, VK_BACK, VK_RETURN,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        EnumWindows, GetWindowTextW, IsIconic, IsWindowVisible, SetForegroundWindow, ShowWindow,
        SW_RESTORE,
    };

    struct FindState<'a> {
        fragment: &'a str,
        found: Option<HWND>,
    }

    /// First visible top-level window whose title contains `fragment`.
    pub fn find_window(fragment: &str) -> Result<HWND, AutomationError> {
        let mut state = FindState {
            fragment,
            found: None,
        };
        unsafe {
            // Enumeration always runs to completion; a failed walk simply
            // leaves `found` empty.
            let _ = EnumWindows(
                Some(enum_proc),
                LPARAM(&mut state as *mut FindState as isize),
            );
        }
        state.found.ok_or(AutomationError::WindowNotFound)
    }

    unsafe extern "system" fn enum_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
        let state = &mut *(lparam.0 as *mut FindState);
        if state.found.is_none() && IsWindowVisible(hwnd).as_bool() {
            let mut buffer = [0u16; 512];
            let len = GetWindowTextW(hwnd, &mut buffer);
            if len > 0 {
                let title = String::from_utf16_lossy(&buffer[..len as usize]);
                if title.contains(state.fragment) {
                    state.found = Some(hwnd);
                }
            }
        }
        TRUE
    }

    /// Restore-if-minimised, then bring to the foreground.
    pub fn focus(hwnd: HWND) -> Result<(), AutomationError> {
        unsafe {
            if IsIconic(hwnd).as_bool() {
                let _ = ShowWindow(hwnd, SW_RESTORE);
            }
            if !SetForegroundWindow(hwnd).as_bool() {
                return Err(AutomationError::FocusDenied);
            }
        }
        Ok(())
    }

    pub fn tap_enter() -> Result<(), AutomationError> {
        tap_virtual_key(VK_RETURN)
    }

    pub fn tap_backspace() -> Result<(), AutomationError> {
        tap_virtual_key(VK_BACK)
    }

    fn tap_virtual_key(vk: VIRTUAL_KEY) -> Result<(), AutomationError> {
        let inputs = [
            key_event(vk, 0, KEYBD_EVENT_FLAGS(0)),
            key_event(vk, 0, KEYEVENTF_KEYUP),
        ];
        send_inputs(&inputs)
    }

    /// Type `text` verbatim as Unicode scan events — layout-independent,
    /// no escaping of any kind.
    pub fn type_text(text: &str) -> Result<(), AutomationError> {
        let mut inputs = Vec::with_capacity(text.len() * 2);
        for unit in text.encode_utf16() {
            inputs.push(key_event(VIRTUAL_KEY(0), unit, KEYEVENTF_UNICODE));
            inputs.push(key_event(
                VIRTUAL_KEY(0),
                unit,
                KEYEVENTF_UNICODE | KEYEVENTF_KEYUP,
            ));
        }
        if inputs.is_empty() {
            return Ok(());
        }
        send_inputs(&inputs)
    }

    fn key_event(vk: VIRTUAL_KEY, scan: u16, flags: KEYBD_EVENT_FLAGS) -> INPUT {
        INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: vk,
                    wScan: scan,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        }
    }

    fn send_inputs(inputs: &[INPUT]) -> Result<(), AutomationError> {
        let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
        if sent as usize != inputs.len() {
            return Err(AutomationError::InputRejected {
                sent: sent as usize,
                expected: inputs.len(),
            });
        }
        Ok(())
    }
}
