use crate::da::Queue;

pub fn render_status(queue: &Queue) -> String {
    let mut status = format!(
        "The queue is {}",
        if queue.is_active { "active" } else { "deactivated" }
    );
    if queue.users.is_empty() {
        status.push_str(" and empty.");
        return status;
    }
    status.push_str(&format!(
        ". There are {} user(s) in the queue:\n",
        queue.users.len()
    ));
    push_numbered(&mut status, &queue.users);
    status
}

pub fn render_admins(queue: &Queue) -> String {
    let mut reply = format!("Admins of {}:\n", queue.name);
    push_numbered(&mut reply, &queue.admins);
    reply
}

fn push_numbered(out: &mut String, names: &[String]) {
    for (i, name) in names.iter().enumerate() {
        out.push_str(&format!("{}. @{}\n", i + 1, name));
    }
}

pub fn help_text(owner: &str) -> String {
    format!(
        "Hello, I am Queue Bot. I was made to manage queues in group chats. \
         There is only one /queue per chat. Use /enter or /leave to manage your presence \
         in the queue, /where to see your position and /who to see who is first. \
         Use /admins to view the list of admins for the queue. \
         Admins can /add to or /remove from the queue, /pop the first user or /reset it. \
         Admins can use /promote or /demote to manage permissions and /cooldown to limit \
         how often /queue, /who and /admins may be called. \
         Admins can also /activate and /deactivate the queue. If the queue is deactivated \
         users cannot enter or leave the queue by themselves.\n\n\
         Report any problems to @{}.",
        owner
    )
}

pub fn help_text_ru(owner: &str) -> String {
    format!(
        "Привет, я Queue Bot. Я управляю очередями в групповых чатах. \
         В каждом чате есть только одна очередь: /queue. Используйте /enter или /leave, \
         чтобы встать в очередь или выйти из неё, /where, чтобы узнать свою позицию, \
         и /who, чтобы узнать, кто первый. Список администраторов: /admins. \
         Администраторы могут добавлять (/add) и удалять (/remove) участников, \
         убирать первого (/pop) или очищать очередь (/reset). \
         Права выдаются и снимаются командами /promote и /demote, а /cooldown задаёт, \
         как часто можно вызывать /queue, /who и /admins. \
         Администраторы также могут включить (/activate) и выключить (/deactivate) очередь. \
         Пока очередь выключена, участники не могут сами входить в неё и выходить.\n\n\
         О проблемах сообщайте @{}.",
        owner
    )
}
