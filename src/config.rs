use clap::Parser;

#[derive(Parser, Clone)]
pub struct Config {
    #[clap(env, long)]
    pub database_url: String,

    /// Image-classification endpoint the cuisine inference pipeline posts to.
    #[clap(
        env,
        long,
        default_value = "https://api-inference.huggingface.co/models/ewanlong/food_type_image_detection"
    )]
    pub inference_api_url: String,

    #[clap(env, long)]
    pub inference_api_key: String,

    #[clap(env, long, default_value = "5000")]
    pub port: u16,

    /// Comma-separated list of allowed CORS origins.
    #[clap(env, long)]
    pub origin_urls: String,
}
