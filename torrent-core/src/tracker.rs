use torrent_parser::model::TrackerResponse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerStatus {
    pub complete: i64,
    pub incomplete: i64,
    pub peers: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TrackerConnectionState {
    Connected(TrackerStatus),
    Failed(String),
    #[default]
    NotContacted,
}

#[derive(Debug, Clone)]
pub struct Tracker {
    pub announce: String,
    pub interval: i64,
    pub min_interval: Option<i64>,
    pub state: TrackerConnectionState,
    pub tracker_id: Option<String>,
}

impl Tracker {
    pub fn new(announce: String) -> Self {
        Tracker {
            announce,
            interval: 0,
            min_interval: None,
            state: TrackerConnectionState::default(),
            tracker_id: None,
        }
    }

    pub fn update(&mut self, resp: &TrackerResponse, peers: usize) {
        if let Some(reason) = &resp.failure_reason {
            self.state = TrackerConnectionState::Failed(reason.clone());
            return;
        }

        self.interval = resp.interval;
        self.min_interval = resp.min_interval;
        // trackers only send the id once; keep it for later announces
        if let Some(id) = &resp.tracker_id {
            self.tracker_id = Some(id.clone());
        }
        self.state = TrackerConnectionState::Connected(TrackerStatus {
            complete: resp.complete,
            incomplete: resp.incomplete,
            peers,
        });
    }

    pub fn fail(&mut self, reason: String) {
        self.state = TrackerConnectionState::Failed(reason);
    }

    pub fn is_contacted(&self) -> bool {
        !matches!(self.state, TrackerConnectionState::NotContacted)
    }
}

impl From<String> for Tracker {
    fn from(value: String) -> Self {
        Tracker::new(value)
    }
}

// we consider two trackers to be equal if they have the same announce URL
impl PartialEq for Tracker {
    fn eq(&self, other: &Self) -> bool {
        self.announce == other.announce
    }
}
