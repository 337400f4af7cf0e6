pub mod openweather;

pub use openweather::OpenWeatherProvider;
