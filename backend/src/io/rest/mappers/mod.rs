pub mod feeding_mapper;

pub use feeding_mapper::FeedingMapper;
