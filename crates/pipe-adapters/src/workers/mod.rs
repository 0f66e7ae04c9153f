mod volume;

pub use volume::VolumeWorkerClient;
