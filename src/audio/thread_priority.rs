// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use thread_priority::{set_current_thread_priority, ThreadPriority, ThreadPriorityValue};

/// Priority for the mixing callback thread when SFXDRIVER_THREAD_PRIORITY is unset.
const DEFAULT_CALLBACK_THREAD_PRIORITY: u8 = 70;

/// Reads SFXDRIVER_THREAD_PRIORITY (0-99) once, before the stream is built.
pub fn callback_thread_priority() -> ThreadPriority {
    let value = parse_priority(std::env::var("SFXDRIVER_THREAD_PRIORITY").ok().as_deref());
    match ThreadPriorityValue::try_from(value) {
        Ok(value) => ThreadPriority::Crossplatform(value),
        Err(_) => ThreadPriority::Max,
    }
}

fn parse_priority(value: Option<&str>) -> u8 {
    value
        .and_then(|v| v.parse::<u8>().ok())
        .filter(|n| *n < 100)
        .unwrap_or(DEFAULT_CALLBACK_THREAD_PRIORITY)
}

/// Raises the priority of the calling thread the first time it is called.
/// Failure is not an error; the callback simply runs at normal priority.
pub fn configure_callback_thread(priority: ThreadPriority, priority_set: &mut bool) {
    if *priority_set {
        return;
    }
    let _ = set_current_thread_priority(priority);
    *priority_set = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_priority() {
        assert_eq!(parse_priority(None), DEFAULT_CALLBACK_THREAD_PRIORITY);
        assert_eq!(parse_priority(Some("not a number")), DEFAULT_CALLBACK_THREAD_PRIORITY);
        assert_eq!(parse_priority(Some("150")), DEFAULT_CALLBACK_THREAD_PRIORITY);
        assert_eq!(parse_priority(Some("42")), 42);
    }
}
