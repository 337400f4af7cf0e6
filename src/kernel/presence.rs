use serde::{Deserialize, Serialize};

/// Speech-input capability as the dialogue sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListenerState {
    /// No recognizer on this host. Only the form works.
    #[default]
    Unavailable,
    Ready,
    /// Start requested, recognizer has not confirmed yet.
    Starting,
    Listening,
}

/// Requests that may move the listener. The graph decides whether they apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerRequest {
    Start,
    Started,
    Ended,
    Failed,
    Stop,
}

pub struct ListenerGraph;

impl ListenerGraph {
    /// Pure function: (current, request) -> next. `None` means ignored.
    pub fn transition(current: ListenerState, request: ListenerRequest) -> Option<ListenerState> {
        use ListenerRequest::*;
        use ListenerState::*;

        match (current, request) {
            (Unavailable, _) => None,

            (Ready, Start) => Some(Starting),
            // Recognizers may report start without an explicit request.
            (Ready, Started) => Some(Listening),

            (Starting, Started) => Some(Listening),
            (Starting, Ended | Failed | Stop) => Some(Ready),

            (Listening, Ended | Failed | Stop) => Some(Ready),

            _ => None,
        }
    }

    pub fn is_active(state: ListenerState) -> bool {
        matches!(state, ListenerState::Starting | ListenerState::Listening)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_cycle() {
        let s = ListenerGraph::transition(ListenerState::Ready, ListenerRequest::Start).unwrap();
        assert_eq!(s, ListenerState::Starting);
        let s = ListenerGraph::transition(s, ListenerRequest::Started).unwrap();
        assert_eq!(s, ListenerState::Listening);
        assert_eq!(ListenerGraph::transition(s, ListenerRequest::Start), None);
        let s = ListenerGraph::transition(s, ListenerRequest::Failed).unwrap();
        assert_eq!(s, ListenerState::Ready);
        assert_eq!(ListenerGraph::transition(s, ListenerRequest::Ended), None);
    }

    #[test]
    fn unavailable_is_terminal() {
        for req in [
            ListenerRequest::Start,
            ListenerRequest::Started,
            ListenerRequest::Ended,
            ListenerRequest::Failed,
            ListenerRequest::Stop,
        ] {
            assert_eq!(ListenerGraph::transition(ListenerState::Unavailable, req), None);
        }
    }
}
