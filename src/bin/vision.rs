use wizardy::handlers::VisionHandler;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    wizardy::lambda::start("vision", VisionHandler::from_platform).await
}
