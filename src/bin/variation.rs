use wizardy::handlers::VariationHandler;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    wizardy::lambda::start("variation", VariationHandler::from_platform).await
}
