//! Status helper enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data in the
//! corresponding `*_statuses` table.

use swipegen_core::job::JobState;

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up the variant for a database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                $( if id == $val { return Some($name::$variant); } )+
                None
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Durable generation queue job status.
    QueueJobStatus {
        Waiting = 1,
        Active = 2,
        Completed = 3,
        Failed = 4,
    }
}

impl QueueJobStatus {
    /// The state name reported to polling clients.
    pub fn job_state(self) -> JobState {
        match self {
            QueueJobStatus::Waiting => JobState::Waiting,
            QueueJobStatus::Active => JobState::Active,
            QueueJobStatus::Completed => JobState::Completed,
            QueueJobStatus::Failed => JobState::Failed,
        }
    }
}
