use wizardy::handlers::GeneralHandler;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    wizardy::lambda::start("general", GeneralHandler::from_platform).await
}
