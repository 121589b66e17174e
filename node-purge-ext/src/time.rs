use super::*;

pub trait TimeExt: Sized {
    /// Wall-clock instant of this timestamp.
    fn to_system_time(&self) -> SystemTime;

    /// `None` when `time` cannot be represented.
    fn from_system_time(time: SystemTime) -> Option<Self>;
}

impl TimeExt for metav1::Time {
    fn to_system_time(&self) -> SystemTime {
        SystemTime::from(self.0)
    }

    fn from_system_time(time: SystemTime) -> Option<Self> {
        time.try_into().ok().map(Self)
    }
}
